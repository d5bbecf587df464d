use dioxus::prelude::*;
use dioxus_logger::tracing;
use earnings_types::{
    format_guidance_value, format_magnitude, normalize_ticker, ApiError, BuybackEntry,
    ContextPanel, Document, FailurePolicy, GuidanceEntry, LoadPhase, MetricValue, UploadResponse,
    PLACEHOLDER,
};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;

use super::styles::DOCUMENTS_STYLES;
use super::CitationList;
use crate::api::{
    delete_document, fetch_buybacks, fetch_documents, fetch_guidance, fetch_metrics, ingest_symbol,
    ingest_url, upload_document,
};
use crate::effects::load_panel;
use crate::state::{push_toast, use_app_state, use_context_handle, ToastKind};
use crate::theme::set_cached_theme_preference;

const UPLOAD_INPUT_ID: &str = "pdf-upload";

fn selected_file(input_id: &str) -> Option<web_sys::File> {
    web_sys::window()?
        .document()?
        .get_element_by_id(input_id)?
        .dyn_into::<HtmlInputElement>()
        .ok()?
        .files()?
        .item(0)
}

fn uploaded_message(response: &UploadResponse) -> String {
    format!("Ingested {} ({} chunks)", response.doc_id, response.chunk_count)
}

#[component]
pub fn Documents() -> Element {
    let app = use_app_state();
    let context = use_context_handle();
    let active_doc = app.active_doc;
    let mut theme = app.theme;

    let mut docs = use_signal(Vec::<Document>::new);
    let mut docs_loading = use_signal(|| false);
    let mut docs_error = use_signal(|| None::<String>);
    let mut busy = use_signal(|| false);
    let mut action_error = use_signal(|| None::<String>);

    let mut url_input = use_signal(String::new);
    let mut url_ticker = use_signal(String::new);
    let mut url_company = use_signal(String::new);
    let mut symbol_input = use_signal(String::new);

    let metrics = use_signal(ContextPanel::<Vec<MetricValue>>::default);
    let guidance = use_signal(ContextPanel::<Vec<GuidanceEntry>>::default);
    let buybacks = use_signal(ContextPanel::<Vec<BuybackEntry>>::default);

    let load_docs = use_callback(move |_: ()| {
        spawn(async move {
            docs_loading.set(true);
            docs_error.set(None);
            match fetch_documents().await {
                Ok(list) => docs.set(list),
                Err(e) => docs_error.set(Some(e.to_string())),
            }
            docs_loading.set(false);
        });
    });

    use_effect(move || load_docs.call(()));

    use_effect(move || {
        let doc_id = active_doc();
        spawn(load_panel(metrics, doc_id.clone(), |id| async move {
            fetch_metrics(&id, FailurePolicy::Silent).await
        }));
        spawn(load_panel(guidance, doc_id.clone(), |id| async move {
            Ok::<_, ApiError>(fetch_guidance(&id).await)
        }));
        spawn(load_panel(buybacks, doc_id, |id| async move {
            Ok::<_, ApiError>(fetch_buybacks(&id).await)
        }));
    });

    // Shared tail of upload / ingest: activate the new document and refresh the list.
    let finish_ingest = {
        let context = context.clone();
        use_callback(move |result: Result<UploadResponse, ApiError>| {
            match result {
                Ok(response) => {
                    context.set(&response.doc_id);
                    push_toast(app.toasts, uploaded_message(&response), ToastKind::Success);
                    load_docs.call(());
                }
                Err(e) => {
                    tracing::warn!(error = %e, "ingest failed");
                    action_error.set(Some(e.to_string()));
                }
            }
            busy.set(false);
        })
    };

    let upload = move |_| {
        let Some(file) = selected_file(UPLOAD_INPUT_ID) else {
            action_error.set(Some("Choose a PDF first".to_string()));
            return;
        };
        busy.set(true);
        action_error.set(None);
        spawn(async move {
            finish_ingest.call(upload_document(file).await);
        });
    };

    let ingest_from_url = move |_| {
        let url = url_input();
        let ticker = normalize_ticker(&url_ticker());
        if url.trim().is_empty() || ticker.is_empty() {
            action_error.set(Some("URL and ticker are required".to_string()));
            return;
        }
        let company = url_company().trim().to_string();
        busy.set(true);
        action_error.set(None);
        spawn(async move {
            let company = (!company.is_empty()).then_some(company);
            finish_ingest.call(ingest_url(&url, &ticker, company.as_deref()).await);
        });
    };

    let ingest_from_symbol = move |_| {
        let ticker = normalize_ticker(&symbol_input());
        if ticker.is_empty() {
            action_error.set(Some("Enter a ticker".to_string()));
            return;
        }
        busy.set(true);
        action_error.set(None);
        spawn(async move {
            finish_ingest.call(ingest_symbol(&ticker).await);
        });
    };

    let remove_doc = {
        let context = context.clone();
        use_callback(move |doc_id: String| {
            let context = context.clone();
            spawn(async move {
                match delete_document(&doc_id).await {
                    Ok(()) => {
                        docs.write().retain(|doc| doc.id != doc_id);
                        if active_doc().as_deref() == Some(doc_id.as_str()) {
                            context.clear();
                        }
                        push_toast(app.toasts, "Document deleted", ToastKind::Success);
                    }
                    Err(e) => push_toast(app.toasts, e.to_string(), ToastKind::Error),
                }
            });
        })
    };

    let select_doc = use_callback(move |doc_id: String| {
        context.set(&doc_id);
    });

    let toggle_dark = move |_| {
        let next = theme().toggle();
        theme.set(next);
        set_cached_theme_preference(next);
    };

    let metric_panel = metrics.read();
    let guidance_panel = guidance.read();
    let buyback_panel = buybacks.read();

    rsx! {
        style { {DOCUMENTS_STYLES} }
        div { class: "row", style: "justify-content: flex-end;",
            label { class: "row muted",
                input {
                    r#type: "checkbox",
                    checked: theme().is_dark(),
                    onchange: toggle_dark,
                }
                "Dark mode"
            }
        }
        div { class: "documents-layout",
            div {
                section { class: "card",
                    h2 { "Add documents" }
                    div { class: "row",
                        input { id: UPLOAD_INPUT_ID, r#type: "file", accept: ".pdf,application/pdf" }
                        button { class: "btn btn-primary", disabled: busy(), onclick: upload, "Upload" }
                    }
                    div { class: "row", style: "margin-top: 0.5rem;",
                        input {
                            class: "input",
                            placeholder: "Filing URL",
                            value: "{url_input}",
                            oninput: move |e: FormEvent| url_input.set(e.value()),
                        }
                        input {
                            class: "input",
                            placeholder: "Ticker",
                            size: "6",
                            value: "{url_ticker}",
                            oninput: move |e: FormEvent| url_ticker.set(e.value()),
                        }
                        input {
                            class: "input",
                            placeholder: "Company (optional)",
                            value: "{url_company}",
                            oninput: move |e: FormEvent| url_company.set(e.value()),
                        }
                        button { class: "btn", disabled: busy(), onclick: ingest_from_url, "Ingest URL" }
                    }
                    div { class: "row", style: "margin-top: 0.5rem;",
                        input {
                            class: "input",
                            placeholder: "Symbol, e.g. AAPL",
                            value: "{symbol_input}",
                            oninput: move |e: FormEvent| symbol_input.set(e.value()),
                        }
                        button { class: "btn", disabled: busy(), onclick: ingest_from_symbol, "Ingest latest filing" }
                    }
                    if busy() {
                        p { class: "muted", "Working…" }
                    }
                    if let Some(err) = action_error() {
                        p { class: "error-text", "{err}" }
                    }
                }

                section { class: "card",
                    div { class: "row", style: "justify-content: space-between;",
                        h2 { "Documents" }
                        button {
                            class: "btn",
                            disabled: docs_loading(),
                            onclick: move |_| load_docs.call(()),
                            if docs_loading() { "Loading…" } else { "Load docs" }
                        }
                    }
                    if let Some(err) = docs_error() {
                        p { class: "error-text", "{err}" }
                    }
                    if !docs_loading() && docs.read().is_empty() {
                        p { class: "muted", "No documents yet." }
                    }
                    for doc in docs.read().iter().cloned() {
                        DocRow {
                            key: "{doc.id}",
                            active: active_doc().as_deref() == Some(doc.id.as_str()),
                            doc: doc.clone(),
                            on_select: select_doc,
                            on_delete: remove_doc,
                        }
                    }
                }
            }

            div {
                if active_doc().is_none() {
                    section { class: "card",
                        p { class: "muted", "Select a document to see its metrics, guidance and buybacks." }
                    }
                } else {
                    section { class: "card",
                        div { class: "row", style: "justify-content: space-between;",
                            h2 { "Metrics" }
                            button {
                                class: "btn",
                                onclick: move |_| {
                                    let mut dock = app.chat_dock_open;
                                    dock.set(true);
                                },
                                "Ask about this document"
                            }
                        }
                        PanelStatus { phase: metric_panel.phase(), error: metric_panel.error().cloned(), empty: metric_panel.data().is_some_and(|m| m.is_empty()) }
                        table { class: "panel-table",
                            tbody {
                                for metric in metric_panel.data().cloned().unwrap_or_default() {
                                    tr { key: "{metric.key}",
                                        td { "{metric.display_name()}" }
                                        td { {format_magnitude(metric.value, metric.unit.as_deref())} }
                                        td { class: "muted", {metric.period.clone().unwrap_or_default()} }
                                        td { CitationList { citations: metric.citations.clone() } }
                                    }
                                }
                            }
                        }
                    }

                    section { class: "card",
                        h2 { "Guidance" }
                        PanelStatus { phase: guidance_panel.phase(), error: guidance_panel.error().cloned(), empty: guidance_panel.data().is_some_and(|g| g.is_empty()) }
                        table { class: "panel-table",
                            tbody {
                                for (i, entry) in guidance_panel.data().cloned().unwrap_or_default().into_iter().enumerate() {
                                    tr { key: "{i}",
                                        td { "{entry.title()}" }
                                        td { {format_guidance_value(&entry).unwrap_or_else(|| PLACEHOLDER.to_string())} }
                                        td {
                                            if let Some(note) = entry.note() {
                                                span { class: "muted", "{note}" }
                                            }
                                            if let Some(confidence) = &entry.confidence {
                                                span { class: "muted", " · {confidence}" }
                                            }
                                            CitationList { citations: entry.citations.clone() }
                                        }
                                    }
                                }
                            }
                        }
                    }

                    section { class: "card",
                        h2 { "Buybacks" }
                        PanelStatus { phase: buyback_panel.phase(), error: buyback_panel.error().cloned(), empty: buyback_panel.data().is_some_and(|b| b.is_empty()) }
                        table { class: "panel-table",
                            tbody {
                                for (i, entry) in buyback_panel.data().cloned().unwrap_or_default().into_iter().enumerate() {
                                    tr { key: "{i}",
                                        td { {entry.period.clone().unwrap_or_else(|| PLACEHOLDER.to_string())} }
                                        td { "Authorized " {format_magnitude(entry.authorization_amount, entry.unit.as_deref())} }
                                        td { "Repurchased " {format_magnitude(entry.repurchased_amount, entry.unit.as_deref())} }
                                        td { CitationList { citations: entry.citations.clone() } }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn DocRow(
    doc: Document,
    active: bool,
    on_select: EventHandler<String>,
    on_delete: EventHandler<String>,
) -> Element {
    let select_id = doc.id.clone();
    let delete_id = doc.id.clone();
    rsx! {
        div { class: if active { "doc-item active" } else { "doc-item" },
            div {
                div { "{doc.label()}" }
                div { class: "muted", "{doc.chunk_count} chunks" }
            }
            div { class: "row",
                button {
                    class: "btn",
                    disabled: active,
                    onclick: move |_| on_select.call(select_id.clone()),
                    if active { "Active" } else { "Set active" }
                }
                button {
                    class: "btn",
                    onclick: move |_| on_delete.call(delete_id.clone()),
                    "Delete"
                }
            }
        }
    }
}

#[component]
fn PanelStatus(phase: LoadPhase, error: Option<ApiError>, empty: bool) -> Element {
    match phase {
        LoadPhase::NoContext => rsx! {},
        LoadPhase::Loading => rsx! { p { class: "muted", "Loading…" } },
        LoadPhase::LoadFailed => rsx! {
            p { class: "error-text", {error.map(|e| e.to_string()).unwrap_or_default()} }
        },
        LoadPhase::Loaded if empty => rsx! { p { class: "muted", "Nothing extracted." } },
        LoadPhase::Loaded => rsx! {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_message_names_document_and_chunks() {
        let response = UploadResponse {
            doc_id: "doc-1".to_string(),
            chunk_count: 12,
        };
        assert_eq!(uploaded_message(&response), "Ingested doc-1 (12 chunks)");
    }
}
