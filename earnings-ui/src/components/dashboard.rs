use chrono::{NaiveDate, Utc};
use dioxus::core::spawn_forever;
use dioxus::prelude::*;
use earnings_types::{
    derive_alerts, derive_trade_ideas, events_on_day, format_event_day, format_percent,
    group_events_by_day, group_events_by_time_of_day, select_next_event, sort_movers,
    top_highlight, watchlist_upcoming_count, week_days, week_end, week_start, AlertPref,
    AlertPrefs, CalendarEvent, EarningsSummary, Highlight, IngestionRun, IngestionStatus,
    KeyValueStorage, Mover, MoverSort, TimeOfDay, TradeIdea, TradeIdeaInputs,
    STORAGE_KEY_ALERT_PREFS,
};

use super::styles::DASHBOARD_STYLES;
use super::{DetailDrawer, Route, TickerChip};
use crate::api::{fetch_calendar, fetch_market_movers, fetch_watchlist_events, ingest_today};
use crate::effects::{
    iso_date, load_highlights, load_ingestion_status, load_summaries, load_week_events,
    set_context_for_ticker, toggle_watchlist,
};
use crate::state::{push_toast, use_app_state, use_context_handle, ToastKind};
use crate::storage::{write_item, WebStorage};

const MOVER_LIMIT: u32 = 10;
const INGEST_LIMIT: u32 = 25;
const STATUS_TICKERS: usize = 12;
const WEEKDAYS: usize = 5;
const TIMES: [TimeOfDay; 3] = [TimeOfDay::Bmo, TimeOfDay::Amc, TimeOfDay::Unknown];

fn load_alert_prefs() -> AlertPrefs {
    WebStorage
        .get_item(STORAGE_KEY_ALERT_PREFS)
        .map(|raw| AlertPrefs::merge_json(&raw))
        .unwrap_or_default()
}

#[component]
pub fn Dashboard() -> Element {
    let app = use_app_state();
    let context = use_context_handle();
    let now = Utc::now();
    let today = now.date_naive();

    let mut week = use_signal(|| week_start(today));
    let mut selected_day = use_signal(|| today);
    let mut events = use_signal(Vec::<CalendarEvent>::new);
    let events_loading = use_signal(|| false);
    let events_error = use_signal(|| None::<String>);

    let today_highlights = use_signal(Vec::<Highlight>::new);
    let week_highlights = use_signal(Vec::<Highlight>::new);
    let highlights_loading = use_signal(|| false);
    let summaries = use_signal(Vec::<EarningsSummary>::new);
    let summaries_loading = use_signal(|| false);
    let mut movers = use_signal(Vec::<Mover>::new);
    let mut mover_sort = use_signal(MoverSort::default);
    let ingestion = use_signal(IngestionStatus::default);
    let mut alert_prefs = use_signal(load_alert_prefs);
    let mut watch_events = use_signal(Vec::<CalendarEvent>::new);
    let mut watch_filter = use_signal(|| None::<TimeOfDay>);
    let mut drawer_ticker = use_signal(|| None::<String>);
    let mut refreshing = use_signal(|| false);
    let mut ingesting = use_signal(|| false);

    use_effect(move || {
        spawn(load_week_events(week(), events, events_loading, events_error));
    });

    // Refetch when the week or the watchlist itself changes.
    use_effect(move || {
        let start = week();
        if app.watchlist.read().is_empty() {
            watch_events.set(Vec::new());
            return;
        }
        spawn(async move {
            let list = fetch_watchlist_events(&iso_date(start), &iso_date(week_end(start))).await;
            watch_events.set(list);
        });
    });

    use_effect(move || {
        spawn(load_highlights(today_highlights, week_highlights, highlights_loading));
        spawn(load_summaries(summaries, summaries_loading));
        spawn(load_ingestion_status(ingestion));
        spawn(async move {
            movers.set(fetch_market_movers(MOVER_LIMIT, &[]).await);
        });
    });

    let open_ticker = use_callback(move |ticker: String| drawer_ticker.set(Some(ticker)));
    let toggle_watch = use_callback(move |ticker: String| {
        spawn_forever(toggle_watchlist(app, ticker));
    });
    let set_context = use_callback(move |ticker: String| {
        spawn_forever(set_context_for_ticker(app, context.clone(), ticker));
    });

    let reload = move |action: DashboardAction| async move {
        for step in reloads_after(action) {
            match step {
                Reload::Week => load_week_events(week(), events, events_loading, events_error).await,
                Reload::Highlights => {
                    load_highlights(today_highlights, week_highlights, highlights_loading).await
                }
                Reload::Summaries => load_summaries(summaries, summaries_loading).await,
                Reload::IngestionStatus => load_ingestion_status(ingestion).await,
            }
        }
    };

    let refresh_week = move |_| {
        if refreshing() {
            return;
        }
        refreshing.set(true);
        spawn(async move {
            let start = week();
            match fetch_calendar(&iso_date(start), &iso_date(week_end(start)), true).await {
                Ok(list) => {
                    events.set(list);
                    push_toast(app.toasts, "Calendar refreshed", ToastKind::Success);
                    reload(DashboardAction::RefreshWeek).await;
                }
                Err(e) => push_toast(app.toasts, e.to_string(), ToastKind::Error),
            }
            refreshing.set(false);
        });
    };

    let run_ingest_today = move |_| {
        if ingesting() {
            return;
        }
        ingesting.set(true);
        spawn(async move {
            match ingest_today(INGEST_LIMIT).await {
                Ok(result) => {
                    push_toast(app.toasts, result.message(), ToastKind::Success);
                    reload(DashboardAction::IngestToday).await;
                }
                Err(e) => push_toast(app.toasts, e.to_string(), ToastKind::Error),
            }
            ingesting.set(false);
        });
    };

    let mut shift_week = move |weeks: i64| {
        let start = week() + chrono::Duration::weeks(weeks);
        week.set(start);
        selected_day.set(start);
    };

    let mut toggle_pref = move |pref: AlertPref| {
        alert_prefs.write().toggle(pref);
        write_item(STORAGE_KEY_ALERT_PREFS, &alert_prefs.read().to_json());
    };

    // Derived views.
    let all_events = events.read().clone();
    let by_day = group_events_by_day(&all_events);
    let days: Vec<NaiveDate> = week_days(week()).into_iter().take(WEEKDAYS).collect();
    let day_events = events_on_day(&all_events, selected_day());
    let day_groups = group_events_by_time_of_day(day_events.iter());

    let today_list = today_highlights.read().clone();
    let week_list = week_highlights.read().clone();
    let top = top_highlight(&today_list, &week_list);
    let watchlist = app.watchlist.read().clone();
    let mover_list = movers.read().clone();
    let next_event = select_next_event(&all_events, now);
    let ideas = derive_trade_ideas(&TradeIdeaInputs {
        top_highlight: top,
        movers: &mover_list,
        watchlist: &watchlist,
        events: &all_events,
        next_event,
        now,
    });
    let upcoming = watchlist_upcoming_count(&all_events, &watchlist, now);
    let alerts = derive_alerts(upcoming, app.active_doc.read().is_some(), &alert_prefs.read());

    let mut sorted_movers = mover_list.clone();
    sort_movers(&mut sorted_movers, mover_sort());

    let watched_events: Vec<CalendarEvent> = watch_events
        .read()
        .iter()
        .filter(|event| watch_filter().map_or(true, |time| event.time_of_day() == time))
        .cloned()
        .collect();

    let next_label = next_event.map(|event| {
        let day = format_event_day(&event.event_date).unwrap_or_else(|| event.event_date.clone());
        format!("Next up: {} · {} {}", event.ticker, day, event.time_of_day().label())
    });
    let week_label = format!(
        "Week of {}",
        days.first().map(|d| d.format("%b %-d").to_string()).unwrap_or_default()
    );
    let prefs = *alert_prefs.read();

    rsx! {
        style { {DASHBOARD_STYLES} }
        div { class: "dashboard-grid",
            div {
                section { class: "card",
                    div { class: "row", style: "justify-content: space-between;",
                        h2 { "{week_label}" }
                        div { class: "row",
                            button { class: "btn", onclick: move |_| shift_week(-1), "‹ Prev" }
                            button { class: "btn", onclick: move |_| shift_week(1), "Next ›" }
                            button {
                                class: "btn",
                                disabled: refreshing(),
                                onclick: refresh_week,
                                if refreshing() { "Refreshing…" } else { "Refresh week" }
                            }
                            button {
                                class: "btn btn-primary",
                                disabled: ingesting(),
                                onclick: run_ingest_today,
                                if ingesting() { "Ingesting…" } else { "Ingest today" }
                            }
                        }
                    }
                    if let Some(label) = next_label {
                        p { class: "muted", "{label}" }
                    }
                    if let Some(err) = events_error() {
                        p { class: "error-text", "{err}" }
                    }
                    div { class: "week-strip",
                        for day in days.iter().copied() {
                            div {
                                key: "{day}",
                                class: if day == selected_day() { "day-cell selected" } else { "day-cell" },
                                onclick: move |_| selected_day.set(day),
                                div { class: "muted", {day.format("%a %-d").to_string()} }
                                div { class: "day-count", {by_day.get(&day).map_or(0, Vec::len).to_string()} }
                            }
                        }
                    }
                    if events_loading() {
                        p { class: "muted", "Loading calendar…" }
                    } else if day_events.is_empty() {
                        p { class: "muted", "No earnings scheduled for this day." }
                    }
                    div { class: "tod-groups",
                        for time in TIMES {
                            div { key: "{time.label()}", class: "tod-group",
                                h4 { "{time.label()} ({day_groups.get(time).len()})" }
                                for event in day_groups.get(time).iter().cloned() {
                                    EventRow {
                                        key: "{event.id}",
                                        watched: watchlist.contains(&event.ticker),
                                        event: event.clone(),
                                        on_open: open_ticker,
                                        on_watch: toggle_watch,
                                    }
                                }
                            }
                        }
                    }
                }

                section { class: "card",
                    h2 { "Highlights" }
                    if highlights_loading() {
                        p { class: "muted", "Loading highlights…" }
                    } else if today_list.is_empty() && week_list.is_empty() {
                        p { class: "muted", "No highlights yet." }
                    }
                    for highlight in today_list.iter().chain(week_list.iter()).cloned() {
                        HighlightCard {
                            key: "{highlight.id}",
                            highlight: highlight.clone(),
                            on_open: open_ticker,
                            on_set_context: set_context,
                        }
                    }
                }

                section { class: "card",
                    h2 { "Today's EPS summaries" }
                    if summaries_loading() {
                        p { class: "muted", "Loading summaries…" }
                    } else if summaries.read().is_empty() {
                        p { class: "muted", "No summaries for today." }
                    }
                    for summary in summaries.read().iter().cloned() {
                        SummaryCard { key: "{summary.ticker}", summary: summary.clone(), on_open: open_ticker }
                    }
                }
            }

            div {
                section { class: "card",
                    h2 { "Trade ideas" }
                    if ideas.is_empty() {
                        p { class: "muted", "Nothing actionable yet." }
                    }
                    for idea in ideas {
                        IdeaCard { key: "{idea.ticker}", idea: idea.clone(), on_open: open_ticker }
                    }
                }

                section { class: "card",
                    h2 { "Alerts" }
                    for alert in alerts {
                        div { key: "{alert.label}", class: "alert-tile",
                            strong { "{alert.label}" }
                            p { class: "muted", "{alert.detail}" }
                        }
                    }
                    div { class: "row",
                        for pref in AlertPref::ALL {
                            label { key: "{pref.label()}", class: "row muted",
                                input {
                                    r#type: "checkbox",
                                    checked: prefs.get(pref),
                                    onchange: move |_| toggle_pref(pref),
                                }
                                "{pref.label()}"
                            }
                        }
                    }
                }

                section { class: "card",
                    div { class: "row", style: "justify-content: space-between;",
                        h2 { "Movers" }
                        div { class: "row",
                            for sort in MoverSort::ALL {
                                button {
                                    key: "{sort.label()}",
                                    class: if sort == mover_sort() { "btn btn-primary" } else { "btn" },
                                    onclick: move |_| mover_sort.set(sort),
                                    "{sort.label()}"
                                }
                            }
                        }
                    }
                    if sorted_movers.is_empty() {
                        p { class: "muted", "No movers." }
                    } else {
                        table { class: "movers-table",
                            tbody {
                                for mover in sorted_movers {
                                    tr { key: "{mover.ticker}",
                                        td {
                                            TickerChip {
                                                ticker: mover.ticker.clone(),
                                                watched: watchlist.contains(&mover.ticker),
                                                on_select: open_ticker,
                                            }
                                        }
                                        td { class: "muted", {mover.company.clone().unwrap_or_default()} }
                                        td {
                                            class: if mover.percent() < 0.0 { "down" } else { "up" },
                                            {format_percent(mover.change_percent)}
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                section { class: "card",
                    div { class: "row", style: "justify-content: space-between;",
                        h2 { "Watchlist ({watchlist.len()})" }
                        div { class: "row",
                            button {
                                class: if watch_filter().is_none() { "btn btn-primary" } else { "btn" },
                                onclick: move |_| watch_filter.set(None),
                                "All"
                            }
                            for time in TIMES {
                                button {
                                    key: "{time.label()}",
                                    class: if watch_filter() == Some(time) { "btn btn-primary" } else { "btn" },
                                    onclick: move |_| watch_filter.set(Some(time)),
                                    "{time.label()}"
                                }
                            }
                        }
                    }
                    if watchlist.is_empty() {
                        p { class: "muted", "Star a ticker to follow it." }
                    } else if watched_events.is_empty() {
                        p { class: "muted", "No watchlist events this week." }
                    }
                    for event in watched_events {
                        EventRow {
                            key: "w{event.id}",
                            watched: true,
                            event: event.clone(),
                            on_open: open_ticker,
                            on_watch: toggle_watch,
                        }
                    }
                }

                IngestionLine { status: ingestion() }
            }
        }

        if let Some(ticker) = drawer_ticker() {
            DetailDrawer {
                key: "{ticker}",
                ticker: ticker.clone(),
                on_close: move |_| drawer_ticker.set(None),
            }
        }
    }
}

#[component]
fn EventRow(
    event: CalendarEvent,
    watched: bool,
    on_open: EventHandler<String>,
    on_watch: EventHandler<String>,
) -> Element {
    let ticker = event.ticker.clone();
    rsx! {
        div { class: "row", style: "justify-content: space-between; padding: 0.15rem 0;",
            div { class: "row",
                TickerChip { ticker: event.ticker.clone(), watched, on_select: on_open }
                if let Some(company) = &event.company {
                    span { class: "muted", "{company}" }
                }
            }
            button {
                class: "btn",
                title: if watched { "Remove from watchlist" } else { "Add to watchlist" },
                onclick: move |_| on_watch.call(ticker.clone()),
                if watched { "★" } else { "☆" }
            }
        }
    }
}

#[component]
fn HighlightCard(
    highlight: Highlight,
    on_open: EventHandler<String>,
    on_set_context: EventHandler<String>,
) -> Element {
    let ticker = highlight.ticker.clone();
    let score = format!("{:.2}", highlight.score());
    rsx! {
        div { class: "highlight-card",
            div { class: "row", style: "justify-content: space-between;",
                div { class: "row",
                    TickerChip { ticker: highlight.ticker.clone(), on_select: on_open }
                    if let Some(company) = &highlight.company {
                        span { class: "muted", "{company}" }
                    }
                }
                div { class: "row",
                    span { class: "muted", "score {score}" }
                    button {
                        class: "btn",
                        onclick: move |_| on_set_context.call(ticker.clone()),
                        "Set context"
                    }
                }
            }
            ul {
                for (i, bullet) in highlight.summary.bullets.iter().enumerate() {
                    li { key: "{i}", "{bullet}" }
                }
            }
        }
    }
}

#[component]
fn IdeaCard(idea: TradeIdea, on_open: EventHandler<String>) -> Element {
    rsx! {
        div { class: "idea-card",
            div { class: "row", style: "justify-content: space-between;",
                TickerChip { ticker: idea.ticker.clone(), on_select: on_open }
                span { class: "confidence", "{idea.confidence.label()}" }
            }
            strong { "{idea.title}" }
            p { class: "muted", "{idea.thesis}" }
            p { "{idea.action}" }
            if let Some(catalyst) = &idea.catalyst {
                p { class: "muted", "Catalyst: {catalyst}" }
            }
            if let Some(timeframe) = &idea.timeframe {
                p { class: "muted", "Timeframe: {timeframe}" }
            }
        }
    }
}

#[component]
fn SummaryCard(summary: EarningsSummary, on_open: EventHandler<String>) -> Element {
    let latest = summary.latest.clone().or_else(|| summary.eps.first().cloned());
    let sources = summary.sources.join(", ");
    rsx! {
        div { class: "summary-card",
            div { class: "row",
                TickerChip { ticker: summary.ticker.clone(), on_select: on_open }
                if let Some(company) = &summary.company {
                    span { class: "muted", "{company}" }
                }
            }
            match latest {
                Some(item) => rsx! {
                    div { class: "metric-row",
                        span { "{item.period}" }
                        span {
                            {format_eps(item.reported_eps)}
                            " vs "
                            {format_eps(item.estimated_eps)}
                        }
                        span {
                            class: if item.surprise_pct.unwrap_or(0.0) < 0.0 { "down" } else { "up" },
                            {format_percent(item.surprise_pct)}
                        }
                    }
                },
                None => rsx! { p { class: "muted", "No EPS reported yet." } },
            }
            if !sources.is_empty() {
                p { class: "muted", "Sources: {sources}" }
            }
        }
    }
}

fn format_eps(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map_or_else(|| earnings_types::PLACEHOLDER.to_string(), |v| format!("{v:.2}"))
}

fn run_summary(label: &str, run: &IngestionRun) -> String {
    let when = run.created_at.clone().unwrap_or_default();
    let mut tickers: Vec<String> = run.tickers.iter().take(STATUS_TICKERS).cloned().collect();
    if run.tickers.len() > STATUS_TICKERS {
        tickers.push(format!("+{}", run.tickers.len() - STATUS_TICKERS));
    }
    let counts = match (run.success, run.requested, run.count) {
        (Some(ok), Some(requested), _) => format!("{ok}/{requested}"),
        (_, _, Some(count)) => count.to_string(),
        _ => String::new(),
    };
    format!("{label}: {when} {counts} {}", tickers.join(" "))
        .trim_end()
        .to_string()
}

#[component]
fn IngestionLine(status: IngestionStatus) -> Element {
    let lines: Vec<String> = [
        status.last_ingest.as_ref().map(|run| run_summary("Last ingest", run)),
        status.last_refresh.as_ref().map(|run| run_summary("Last refresh", run)),
    ]
    .into_iter()
    .flatten()
    .collect();

    rsx! {
        section { class: "card",
            div { class: "row", style: "justify-content: space-between;",
                h3 { "Ingestion" }
                Link { to: Route::Ingestion {}, "All runs" }
            }
            if !status.enabled {
                p { class: "muted", "Scheduled ingestion is off." }
            }
            if lines.is_empty() {
                p { class: "muted", "No ingestion runs recorded." }
            }
            for line in lines {
                p { key: "{line}", class: "muted", "{line}" }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DashboardAction {
    RefreshWeek,
    IngestToday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reload {
    Week,
    Highlights,
    Summaries,
    IngestionStatus,
}

/// Panels left stale by a successful dashboard action, in reload order.
fn reloads_after(action: DashboardAction) -> &'static [Reload] {
    match action {
        // the refreshed week is already in hand
        DashboardAction::RefreshWeek => &[Reload::IngestionStatus],
        DashboardAction::IngestToday => &[
            Reload::Week,
            Reload::Highlights,
            Reload::Summaries,
            Reload::IngestionStatus,
        ],
    }
}
