use std::collections::BTreeMap;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;
use earnings_types::{
    format_guidance_value, format_magnitude, ApiError, ContextPanel, Document, FailurePolicy,
    GuidanceEntry, Highlight, MetricValue, Series, PLACEHOLDER,
};

use super::{CitationList, Sparkline};
use crate::api::{
    fetch_documents_by_ticker, fetch_guidance, fetch_metrics, fetch_series,
    fetch_ticker_highlights, CHART_METRICS,
};
use crate::effects::{load_panel, toggle_watchlist, GUIDANCE_PREVIEW};
use crate::state::{push_toast, use_app_state, use_context_handle, ToastKind};

const DRAWER_METRICS: usize = 6;

/// Side panel for one ticker: recent highlights, its documents, and metrics,
/// guidance and mini charts for the document picked with "Set for charts".
/// Mount it keyed by ticker so a new ticker starts from a clean slate.
#[component]
pub fn DetailDrawer(ticker: String, on_close: EventHandler<()>) -> Element {
    let app = use_app_state();
    let context = use_context_handle();
    let ticker_signal = use_signal(|| ticker.clone());

    let mut highlights = use_signal(Vec::<Highlight>::new);
    let mut docs = use_signal(Vec::<Document>::new);
    let mut docs_loading = use_signal(|| false);
    let mut docs_error = use_signal(|| None::<String>);
    let mut chart_doc = use_signal(|| None::<String>);

    let metrics = use_signal(ContextPanel::<Vec<MetricValue>>::default);
    let guidance = use_signal(ContextPanel::<Vec<GuidanceEntry>>::default);
    let series = use_signal(ContextPanel::<BTreeMap<String, Series>>::default);

    use_effect(move || {
        let ticker = ticker_signal();
        let for_docs = ticker.clone();
        spawn(async move {
            highlights.set(fetch_ticker_highlights(&ticker).await);
        });
        spawn(async move {
            docs_loading.set(true);
            docs_error.set(None);
            match fetch_documents_by_ticker(&for_docs, FailurePolicy::Surface).await {
                Ok(list) => {
                    chart_doc.set(list.first().map(|doc| doc.id.clone()));
                    docs.set(list);
                }
                Err(e) => docs_error.set(Some(e.to_string())),
            }
            docs_loading.set(false);
        });
    });

    use_effect(move || {
        let doc_id = chart_doc();
        spawn(load_panel(metrics, doc_id.clone(), |id| async move {
            fetch_metrics(&id, FailurePolicy::Silent).await
        }));
        spawn(load_panel(guidance, doc_id.clone(), |id| async move {
            Ok::<_, ApiError>(fetch_guidance(&id).await)
        }));
        spawn(load_panel(series, doc_id, |id| async move {
            Ok::<_, ApiError>(fetch_series(&id, &CHART_METRICS).await)
        }));
    });

    let set_context = move |doc_id: String| {
        if context.set(&doc_id) {
            let mut dock = app.chat_dock_open;
            dock.set(true);
            push_toast(app.toasts, format!("Context set: {doc_id}"), ToastKind::Success);
        }
    };

    let watched = app.watchlist.read().contains(&ticker);
    let watch_ticker = ticker.clone();
    let metric_panel = metrics.read();
    let guidance_panel = guidance.read();
    let series_panel = series.read();

    rsx! {
        aside { class: "drawer",
            div { class: "drawer-header",
                h2 { "{ticker}" }
                div { class: "row",
                    button {
                        class: "btn",
                        onclick: move |_| {
                            spawn_forever(toggle_watchlist(app, watch_ticker.clone()));
                        },
                        if watched { "★ Watching" } else { "☆ Watch" }
                    }
                    button { class: "btn", onclick: move |_| on_close.call(()), "Close" }
                }
            }

            section { class: "card",
                h3 { "Highlights" }
                if highlights.read().is_empty() {
                    p { class: "muted", "No highlights for {ticker}." }
                }
                for highlight in highlights.read().iter().cloned() {
                    div { key: "{highlight.id}", class: "highlight-card",
                        span { class: "muted", "{highlight.created_at}" }
                        ul {
                            for (i, bullet) in highlight.summary.bullets.iter().enumerate() {
                                li { key: "{i}", "{bullet}" }
                            }
                        }
                    }
                }
            }

            section { class: "card",
                h3 { "Documents" }
                if docs_loading() {
                    p { class: "muted", "Loading documents…" }
                }
                if let Some(err) = docs_error() {
                    p { class: "error-text", "{err}" }
                }
                if !docs_loading() && docs_error().is_none() && docs.read().is_empty() {
                    p { class: "muted", "No documents ingested for {ticker}." }
                }
                for doc in docs.read().iter().cloned() {
                    div {
                        key: "{doc.id}",
                        class: if chart_doc().as_deref() == Some(doc.id.as_str()) { "doc-item active" } else { "doc-item" },
                        span { "{doc.label()}" }
                        div { class: "row",
                            button {
                                class: "btn",
                                onclick: {
                                    let id = doc.id.clone();
                                    move |_| chart_doc.set(Some(id.clone()))
                                },
                                "Set for charts"
                            }
                            button {
                                class: "btn",
                                onclick: {
                                    let id = doc.id.clone();
                                    let set_context = set_context.clone();
                                    move |_| set_context(id.clone())
                                },
                                "Set context"
                            }
                        }
                    }
                }
            }

            section { class: "card",
                h3 { "Metrics" }
                if metric_panel.is_loading() {
                    p { class: "muted", "Loading metrics…" }
                }
                if let Some(err) = metric_panel.error() {
                    p { class: "error-text", "{err}" }
                }
                for metric in metric_panel.data().map(|m| m.iter().take(DRAWER_METRICS).cloned().collect::<Vec<_>>()).unwrap_or_default() {
                    div { key: "{metric.key}",
                        div { class: "metric-row",
                            span { "{metric.display_name()}" }
                            span { {format_magnitude(metric.value, metric.unit.as_deref())} }
                        }
                        CitationList { citations: metric.citations.clone() }
                    }
                }
                for key in CHART_METRICS {
                    div { key: "{key}", class: "metric-row",
                        span { class: "muted", "{key}" }
                        Sparkline {
                            values: series_panel.data().and_then(|all| all.get(key)).map(|s| s.values.clone()).unwrap_or_default(),
                        }
                    }
                }
            }

            section { class: "card",
                h3 { "Guidance" }
                if guidance_panel.is_loading() {
                    p { class: "muted", "Loading guidance…" }
                } else if guidance_panel.data().is_some_and(|g| g.is_empty()) {
                    p { class: "muted", "No guidance extracted." }
                }
                for (i, entry) in guidance_panel.data().map(|g| g.iter().take(GUIDANCE_PREVIEW).cloned().collect::<Vec<_>>()).unwrap_or_default().into_iter().enumerate() {
                    div { key: "{i}",
                        div { class: "metric-row",
                            span { "{entry.title()}" }
                            span { {format_guidance_value(&entry).unwrap_or_else(|| PLACEHOLDER.to_string())} }
                        }
                        if let Some(note) = entry.note() {
                            p { class: "muted", "{note}" }
                        }
                        CitationList { citations: entry.citations.clone() }
                    }
                }
            }
        }
    }
}
