use dioxus::prelude::*;
use earnings_types::{filter_ingestion_runs, ingestion_run_details, IngestionRun, JobFilter, PLACEHOLDER};

use super::styles::DOCUMENTS_STYLES;
use crate::api::fetch_recent_ingestion;

const RECENT_RUNS: u32 = 50;

fn count(value: Option<i64>) -> String {
    value.map_or_else(|| PLACEHOLDER.to_string(), |n| n.to_string())
}

fn job_label(filter: JobFilter) -> &'static str {
    match filter {
        JobFilter::All => "All jobs",
        JobFilter::IngestToday => "Ingest today",
        JobFilter::RefreshNext14Days => "Calendar refresh (14 days)",
    }
}

/// Recent ingestion and calendar-refresh runs.
#[component]
pub fn Ingestion() -> Element {
    let mut runs = use_signal(Vec::<IngestionRun>::new);
    let mut loading = use_signal(|| false);
    let mut error = use_signal(|| None::<String>);
    let mut filter = use_signal(JobFilter::default);

    let reload = use_callback(move |_: ()| {
        spawn(async move {
            loading.set(true);
            error.set(None);
            match fetch_recent_ingestion(RECENT_RUNS).await {
                Ok(list) => runs.set(list),
                Err(e) => error.set(Some(e.to_string())),
            }
            loading.set(false);
        });
    });

    use_effect(move || reload.call(()));

    let visible = filter_ingestion_runs(&runs.read(), filter());

    rsx! {
        style { {DOCUMENTS_STYLES} }
        section { class: "card",
            div { class: "row", style: "justify-content: space-between;",
                h2 { "Ingestion runs" }
                div { class: "row",
                    select {
                        class: "input",
                        value: "{filter().as_str()}",
                        onchange: move |e: FormEvent| filter.set(JobFilter::parse(&e.value())),
                        for option_filter in JobFilter::ALL {
                            option {
                                key: "{option_filter.as_str()}",
                                value: option_filter.as_str(),
                                selected: option_filter == filter(),
                                {job_label(option_filter)}
                            }
                        }
                    }
                    button {
                        class: "btn",
                        disabled: loading(),
                        onclick: move |_| reload.call(()),
                        if loading() { "Loading…" } else { "Reload" }
                    }
                }
            }
            if let Some(err) = error() {
                p { class: "error-text", "{err}" }
            }
            if !loading() && error().is_none() && visible.is_empty() {
                p { class: "muted", "No runs recorded." }
            }
            if !visible.is_empty() {
                table { class: "runs-table",
                    thead {
                        tr {
                            th { "When" }
                            th { "Job" }
                            th { "Requested" }
                            th { "Success" }
                            th { "Errors" }
                            th { "Details" }
                        }
                    }
                    tbody {
                        for (i, run) in visible.iter().enumerate() {
                            tr { key: "{i}",
                                td { {run.created_at.clone().unwrap_or_else(|| PLACEHOLDER.to_string())} }
                                td { "{run.job_type}" }
                                td { {count(run.requested.or(run.count))} }
                                td { {count(run.success)} }
                                td { {count(run.error_count)} }
                                td { class: "muted", {ingestion_run_details(run)} }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_render_placeholder_when_missing() {
        assert_eq!(count(Some(7)), "7");
        assert_eq!(count(None), PLACEHOLDER);
    }

    #[test]
    fn every_filter_has_a_label() {
        for filter in JobFilter::ALL {
            assert!(!job_label(filter).is_empty());
        }
    }
}
