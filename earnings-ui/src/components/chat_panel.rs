use dioxus::prelude::*;
use dioxus_logger::tracing;
use earnings_types::{
    context_suggestions, format_guidance_value, format_magnitude, snapshot_metrics, ChatExchange,
    ContextPanel, ContextSnapshot, LoadPhase, PLACEHOLDER,
};

use super::{CitationList, Sparkline};
use crate::api::ask_question;
use crate::effects::{load_context_snapshot, load_panel_with};
use crate::state::{push_toast, use_app_state, use_context_handle, ToastKind};

const SNAPSHOT_METRICS: usize = 4;

/// Context picker, context snapshot and the Q&A transcript.
#[component]
pub fn ChatPanel() -> Element {
    let app = use_app_state();
    let context = use_context_handle();
    let active_doc = app.active_doc;

    let mut draft = use_signal(|| active_doc().unwrap_or_default());
    let snapshot = use_signal(ContextPanel::<ContextSnapshot>::default);
    let mut question = use_signal(String::new);
    let mut history = use_signal(Vec::<ChatExchange>::new);
    let mut asking = use_signal(|| false);
    let mut ask_error = use_signal(|| None::<String>);

    // Follow the active document, from this tab or another.
    use_effect(move || {
        let doc_id = active_doc();
        if let Some(id) = &doc_id {
            draft.set(id.clone());
        }
        spawn(load_panel_with(
            snapshot,
            doc_id,
            load_context_snapshot,
            ContextSnapshot::keep_after_failure,
        ));
    });

    let ask = use_callback(move |text: String| {
        let text = text.trim().to_string();
        if text.is_empty() || asking() {
            return;
        }
        asking.set(true);
        ask_error.set(None);
        spawn(async move {
            let doc_id = active_doc();
            match ask_question(doc_id.as_deref(), &text).await {
                Ok(response) => {
                    history.write().push(ChatExchange::new(text, response));
                    question.set(String::new());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "question failed");
                    ask_error.set(Some(e.to_string()));
                }
            }
            asking.set(false);
        });
    });

    let set_context = {
        let context = context.clone();
        move |_| {
            if !context.set(&draft()) {
                push_toast(app.toasts, "Enter a document id", ToastKind::Info);
            }
        }
    };
    let clear_context = move |_| {
        context.clear();
        draft.set(String::new());
    };

    let panel = snapshot.read();
    let kept = panel.data().is_some();
    let data = panel.data().cloned().unwrap_or_default();
    let ticker = data.document.as_ref().and_then(|doc| doc.ticker.clone());
    let suggestions = context_suggestions(ticker.as_deref(), !data.guidance.is_empty());

    rsx! {
        div { class: "chat-panel",
            div { class: "row",
                input {
                    class: "input",
                    placeholder: "Document id",
                    value: "{draft}",
                    oninput: move |e: FormEvent| draft.set(e.value()),
                }
                button { class: "btn", onclick: set_context, "Set" }
                button { class: "btn", disabled: active_doc().is_none(), onclick: clear_context, "Clear" }
            }

            match panel.phase() {
                LoadPhase::NoContext => rsx! {
                    p { class: "muted", "No document selected. Questions go to the whole corpus." }
                },
                LoadPhase::Loading => rsx! {
                    p { class: "muted", "Loading context…" }
                },
                LoadPhase::LoadFailed => rsx! {
                    p { class: "error-text",
                        {panel.error().map(|e| e.to_string()).unwrap_or_default()}
                    }
                    if kept {
                        SnapshotCard { snapshot: data.clone() }
                    }
                },
                LoadPhase::Loaded => rsx! {
                    SnapshotCard { snapshot: data.clone() }
                },
            }

            div { class: "suggestions",
                for suggestion in suggestions {
                    button {
                        key: "{suggestion.text}",
                        class: "suggestion",
                        disabled: asking(),
                        onclick: {
                            let text = suggestion.text.clone();
                            move |_| {
                                question.set(text.clone());
                                ask.call(text.clone());
                            }
                        },
                        "{suggestion.icon} {suggestion.text}"
                    }
                }
            }

            for (i, exchange) in history.read().iter().enumerate() {
                div { key: "{i}", class: "chat-exchange",
                    div { class: "chat-question", "{exchange.question}" }
                    if exchange.answer.is_empty() {
                        p { class: "muted", "No answer found." }
                    }
                    ul {
                        for (j, bullet) in exchange.answer.iter().enumerate() {
                            li { key: "{j}",
                                "{bullet.text}"
                                CitationList { citations: bullet.citations.clone() }
                            }
                        }
                    }
                    if let Some(chart) = &exchange.chart {
                        Sparkline { values: chart.values.clone() }
                    }
                }
            }

            if let Some(err) = ask_error() {
                p { class: "error-text", "{err}" }
            }

            div { class: "chat-input",
                textarea {
                    class: "input",
                    placeholder: "Ask about earnings…",
                    value: "{question}",
                    oninput: move |e: FormEvent| question.set(e.value()),
                    onkeydown: move |e: KeyboardEvent| {
                        if e.key() == Key::Enter && !e.modifiers().shift() {
                            e.prevent_default();
                            ask.call(question());
                        }
                    },
                }
                button {
                    class: "btn btn-primary",
                    disabled: asking() || question().trim().is_empty(),
                    onclick: move |_| ask.call(question()),
                    if asking() { "Asking…" } else { "Ask" }
                }
            }
        }
    }
}

#[component]
fn SnapshotCard(snapshot: ContextSnapshot) -> Element {
    let metrics = snapshot_metrics(&snapshot.metrics, SNAPSHOT_METRICS);
    let label = snapshot
        .document
        .as_ref()
        .map(|doc| doc.label())
        .unwrap_or_else(|| "Unknown document".to_string());

    rsx! {
        div { class: "chat-snapshot",
            div { class: "chat-question", "{label}" }
            for metric in metrics {
                div { key: "{metric.key}", class: "metric-row",
                    span { "{metric.display_name()}" }
                    span { {format_magnitude(metric.value, metric.unit.as_deref())} }
                }
            }
            for (i, entry) in snapshot.guidance.iter().enumerate() {
                div { key: "g{i}", class: "metric-row",
                    span { "{entry.title()}" }
                    span { {format_guidance_value(entry).unwrap_or_else(|| PLACEHOLDER.to_string())} }
                }
            }
        }
    }
}
