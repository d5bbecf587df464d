use dioxus::prelude::*;
use earnings_types::{sparkline_points, Citation};

use crate::state::{dismiss_toast, use_app_state};

#[component]
pub fn TickerChip(ticker: String, #[props(default)] watched: bool, on_select: EventHandler<String>) -> Element {
    let class = if watched { "ticker-chip watched" } else { "ticker-chip" };
    let value = ticker.clone();
    rsx! {
        span {
            class: "{class}",
            title: "Open {ticker}",
            onclick: move |_| on_select.call(value.clone()),
            if watched { "★" }
            "{ticker}"
        }
    }
}

#[component]
pub fn CitationList(citations: Vec<Citation>) -> Element {
    if citations.is_empty() {
        return rsx! {};
    }
    rsx! {
        div { class: "citations",
            for (i, citation) in citations.iter().enumerate() {
                span {
                    key: "{i}",
                    class: "citation",
                    title: "{citation.snippet}",
                    "{citation.label()}"
                }
            }
        }
    }
}

const SPARK_WIDTH: f64 = 120.0;
const SPARK_HEIGHT: f64 = 28.0;

/// Tiny polyline chart; draws nothing for fewer than two points.
#[component]
pub fn Sparkline(values: Vec<f64>) -> Element {
    if values.len() < 2 {
        return rsx! { span { class: "muted", "No series" } };
    }
    let points = sparkline_points(&values, SPARK_WIDTH, SPARK_HEIGHT);
    rsx! {
        svg {
            class: "sparkline",
            width: "{SPARK_WIDTH}",
            height: "{SPARK_HEIGHT}",
            view_box: "0 0 {SPARK_WIDTH} {SPARK_HEIGHT}",
            polyline { points: "{points}" }
        }
    }
}

#[component]
pub fn Toasts() -> Element {
    let app = use_app_state();
    let mut toasts = app.toasts;

    rsx! {
        div { class: "toasts",
            for toast in toasts.read().iter().cloned() {
                div {
                    key: "{toast.id}",
                    class: toast.kind.class(),
                    onclick: move |_| dismiss_toast(&mut toasts.write(), toast.id),
                    "{toast.message}"
                }
            }
        }
    }
}
