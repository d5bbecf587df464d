//! Derived views: pure functions over already-fetched collections, no I/O.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveDateTime, Utc};

use crate::{
    normalize_ticker, AlertPrefs, CalendarEvent, Highlight, IngestionRun, MetricValue, Mover,
    TimeOfDay, Watchlist,
};

// ============================================================================
// Dates
// ============================================================================

/// Parse an event timestamp. Accepts RFC 3339, naive ISO date-times (read as
/// UTC) and plain dates (UTC midnight).
pub fn parse_event_datetime(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Calendar day an event belongs to, read from the ISO date prefix.
pub fn event_day(event: &CalendarEvent) -> Option<NaiveDate> {
    let prefix = event.event_date.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// `May 2`
pub fn format_event_day(raw: &str) -> Option<String> {
    parse_event_datetime(raw).map(|dt| dt.format("%b %-d").to_string())
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Sunday closing the week that starts on `start`.
pub fn week_end(start: NaiveDate) -> NaiveDate {
    start.checked_add_days(Days::new(6)).unwrap_or(start)
}

pub fn week_days(start: NaiveDate) -> Vec<NaiveDate> {
    (0..7)
        .filter_map(|offset| start.checked_add_days(Days::new(offset)))
        .collect()
}

// ============================================================================
// Calendar grouping
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TimeOfDayGroups {
    pub bmo: Vec<CalendarEvent>,
    pub amc: Vec<CalendarEvent>,
    pub tbd: Vec<CalendarEvent>,
}

impl TimeOfDayGroups {
    pub fn get(&self, time: TimeOfDay) -> &[CalendarEvent] {
        match time {
            TimeOfDay::Bmo => &self.bmo,
            TimeOfDay::Amc => &self.amc,
            TimeOfDay::Unknown => &self.tbd,
        }
    }
}

pub fn group_events_by_time_of_day<'a, I>(events: I) -> TimeOfDayGroups
where
    I: IntoIterator<Item = &'a CalendarEvent>,
{
    let mut groups = TimeOfDayGroups::default();
    for event in events {
        let bucket = match event.time_of_day() {
            TimeOfDay::Bmo => &mut groups.bmo,
            TimeOfDay::Amc => &mut groups.amc,
            TimeOfDay::Unknown => &mut groups.tbd,
        };
        bucket.push(event.clone());
    }
    groups
}

pub fn events_on_day(events: &[CalendarEvent], day: NaiveDate) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|event| event_day(event) == Some(day))
        .cloned()
        .collect()
}

/// Events keyed by day in ascending order; events without a readable date are left out.
pub fn group_events_by_day(events: &[CalendarEvent]) -> BTreeMap<NaiveDate, Vec<CalendarEvent>> {
    let mut days: BTreeMap<NaiveDate, Vec<CalendarEvent>> = BTreeMap::new();
    for event in events {
        if let Some(day) = event_day(event) {
            days.entry(day).or_default().push(event.clone());
        }
    }
    days
}

/// Earliest event at or after `now`. Ties keep input order; unreadable dates are skipped.
pub fn select_next_event(events: &[CalendarEvent], now: DateTime<Utc>) -> Option<&CalendarEvent> {
    events
        .iter()
        .filter_map(|event| {
            parse_event_datetime(&event.event_date)
                .filter(|at| *at >= now)
                .map(|at| (at, event))
        })
        .min_by_key(|(at, _)| *at)
        .map(|(_, event)| event)
}

/// Upcoming events on the watchlist (date at or after `now`).
pub fn watchlist_upcoming_count(
    events: &[CalendarEvent],
    watchlist: &Watchlist,
    now: DateTime<Utc>,
) -> usize {
    if watchlist.is_empty() {
        return 0;
    }
    events
        .iter()
        .filter(|event| watchlist.contains(&event.ticker))
        .filter(|event| parse_event_datetime(&event.event_date).is_some_and(|at| at >= now))
        .count()
}

/// Today's best highlight, else this week's.
pub fn top_highlight<'a>(today: &'a [Highlight], week: &'a [Highlight]) -> Option<&'a Highlight> {
    today.first().or_else(|| week.first())
}

// ============================================================================
// Trade ideas
// ============================================================================

pub const MAX_TRADE_IDEAS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    fn from_rank(score: f64) -> Self {
        if score >= 0.65 {
            Self::High
        } else if score >= 0.5 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeIdea {
    pub ticker: String,
    pub title: String,
    pub thesis: String,
    pub action: String,
    pub confidence: Confidence,
    pub catalyst: Option<String>,
    pub timeframe: Option<String>,
}

pub struct TradeIdeaInputs<'a> {
    pub top_highlight: Option<&'a Highlight>,
    pub movers: &'a [Mover],
    pub watchlist: &'a Watchlist,
    pub events: &'a [CalendarEvent],
    pub next_event: Option<&'a CalendarEvent>,
    pub now: DateTime<Utc>,
}

fn highlight_idea(highlight: &Highlight) -> TradeIdea {
    let score = highlight.score();
    let bullets = &highlight.summary.bullets;
    TradeIdea {
        ticker: highlight.ticker.clone(),
        title: format!("{} post-call setup", normalize_ticker(&highlight.ticker)),
        thesis: bullets.first().cloned().unwrap_or_else(|| {
            "Review call transcript to identify positioning cues before the next session."
                .to_string()
        }),
        action: if score >= 0.65 {
            "Consider long bias".to_string()
        } else {
            "Monitor for confirmation".to_string()
        },
        confidence: Confidence::from_rank(score),
        catalyst: bullets.get(1).cloned().or_else(|| highlight.company.clone()),
        timeframe: Some("Next 1-3 sessions".to_string()),
    }
}

/// Largest absolute move; the first one wins a tie.
fn strongest_mover(movers: &[Mover]) -> Option<&Mover> {
    movers.iter().fold(None, |best: Option<&Mover>, mover| match best {
        Some(current) if current.percent().abs() >= mover.percent().abs() => Some(current),
        _ => Some(mover),
    })
}

fn mover_idea(mover: &Mover) -> TradeIdea {
    let pct = mover.percent();
    let strong = pct.abs() >= 5.0;
    TradeIdea {
        ticker: mover.ticker.clone(),
        title: format!("{} volatility setup", normalize_ticker(&mover.ticker)),
        thesis: format!(
            "Move of {pct:.2}% detected. Gauge implied volatility direction and prep straddle/strangle candidates ahead of earnings."
        ),
        action: if strong {
            "Evaluate volatility strategies".to_string()
        } else {
            "Set alert for continuation".to_string()
        },
        confidence: if strong { Confidence::Medium } else { Confidence::Low },
        catalyst: Some(
            mover
                .company
                .clone()
                .unwrap_or_else(|| "Market mover insight".to_string()),
        ),
        timeframe: Some("Pre-earnings window".to_string()),
    }
}

fn watchlist_idea(event: &CalendarEvent) -> TradeIdea {
    let day = format_event_day(&event.event_date);
    let catalyst = match (event.time_of_day.as_deref(), day) {
        (Some(time), Some(day)) if !time.is_empty() => Some(format!("{time} call · {day}")),
        (Some(time), None) if !time.is_empty() => Some(format!("{time} call")),
        (_, day) => day,
    };
    TradeIdea {
        ticker: event.ticker.clone(),
        title: format!("{} watchlist focus", normalize_ticker(&event.ticker)),
        thesis: "Align prep notes, consensus deltas, and set alerts for BMO/AMC gap risk."
            .to_string(),
        action: "Build earnings game plan".to_string(),
        confidence: Confidence::Medium,
        catalyst,
        timeframe: Some("Upcoming report".to_string()),
    }
}

fn fallback_idea(event: &CalendarEvent) -> TradeIdea {
    TradeIdea {
        ticker: event.ticker.clone(),
        title: format!("{} earnings watch", normalize_ticker(&event.ticker)),
        thesis: "No transcript yet. Gather consensus estimates and prepare questions for the call."
            .to_string(),
        action: "Collect research notes".to_string(),
        confidence: Confidence::Low,
        catalyst: Some(event.event_date.clone()).filter(|d| !d.is_empty()),
        timeframe: Some("Upcoming report".to_string()),
    }
}

/// Best-effort idea list: highlight, strongest mover, nearest watch-listed
/// event, and the next calendar event only when nothing else applies.
/// One idea per ticker, at most four.
pub fn derive_trade_ideas(inputs: &TradeIdeaInputs<'_>) -> Vec<TradeIdea> {
    let mut ideas = Vec::new();

    if let Some(highlight) = inputs.top_highlight {
        ideas.push(highlight_idea(highlight));
    }

    if let Some(mover) = strongest_mover(inputs.movers) {
        ideas.push(mover_idea(mover));
    }

    if !inputs.watchlist.is_empty() {
        let nearest = inputs
            .events
            .iter()
            .filter(|event| inputs.watchlist.contains(&event.ticker))
            .filter_map(|event| {
                parse_event_datetime(&event.event_date)
                    .filter(|at| *at >= inputs.now)
                    .map(|at| (at, event))
            })
            .min_by_key(|(at, _)| *at);
        if let Some((_, event)) = nearest {
            ideas.push(watchlist_idea(event));
        }
    }

    if ideas.is_empty() {
        if let Some(event) = inputs.next_event {
            ideas.push(fallback_idea(event));
        }
    }

    let mut seen = HashSet::new();
    ideas
        .into_iter()
        .filter(|idea| seen.insert(normalize_ticker(&idea.ticker)))
        .take(MAX_TRADE_IDEAS)
        .collect()
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertTile {
    pub label: String,
    pub detail: String,
}

impl AlertTile {
    fn new(label: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            detail: detail.into(),
        }
    }
}

pub fn derive_alerts(watchlist_upcoming: usize, has_context: bool, prefs: &AlertPrefs) -> Vec<AlertTile> {
    let mut alerts = Vec::new();
    if watchlist_upcoming > 0 {
        let detail = if prefs.pre_market || prefs.post_market {
            "Alerts will highlight pre/post-market windows based on your preference."
        } else {
            "Enable alerts below to prep for BMO/AMC gaps."
        };
        alerts.push(AlertTile::new(
            format!("{watchlist_upcoming} watchlist events this week"),
            detail,
        ));
    }
    if !has_context {
        alerts.push(AlertTile::new(
            "No active context",
            "Open a highlight card and click \"Set context\" for tailored prompts.",
        ));
    }
    if !prefs.notify_email && !prefs.notify_in_app {
        alerts.push(AlertTile::new(
            "Notifications disabled",
            "Turn on in-app or email alerts to capture day-of reminders.",
        ));
    }
    if alerts.is_empty() {
        alerts.push(AlertTile::new(
            "All clear",
            "You're tracking everything for this week.",
        ));
    }
    alerts
}

// ============================================================================
// Market movers
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MoverSort {
    #[default]
    Abs,
    Percent,
    Ticker,
}

impl MoverSort {
    pub const ALL: [MoverSort; 3] = [MoverSort::Abs, MoverSort::Percent, MoverSort::Ticker];

    pub fn label(self) -> &'static str {
        match self {
            Self::Abs => "Abs %",
            Self::Percent => "% Change",
            Self::Ticker => "Ticker",
        }
    }
}

/// Stable sort. `Abs` and `Percent` both order by magnitude, largest first.
pub fn sort_movers(movers: &mut [Mover], sort: MoverSort) {
    match sort {
        MoverSort::Ticker => {
            movers.sort_by(|a, b| normalize_ticker(&a.ticker).cmp(&normalize_ticker(&b.ticker)))
        }
        MoverSort::Abs | MoverSort::Percent => movers.sort_by(|a, b| {
            b.percent()
                .abs()
                .partial_cmp(&a.percent().abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
    }
}

// ============================================================================
// Chat suggestions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub text: String,
    pub icon: &'static str,
}

const BASE_SUGGESTIONS: [(&str, &str); 6] = [
    ("Show me today's daily highlights", "✨"),
    ("Show me this week's earnings", "🗓️"),
    ("Show me today's earnings summaries", "🧾"),
    ("What are today's most important earnings?", "📈"),
    ("Which healthcare stocks report next?", "💊"),
    ("Show me pre-market earnings movers", "🚀"),
];

/// Ticker-specific prompts first (when a context document has a ticker), then the defaults.
pub fn context_suggestions(ticker: Option<&str>, has_guidance: bool) -> Vec<Suggestion> {
    let mut out = Vec::new();
    if let Some(ticker) = ticker.map(normalize_ticker).filter(|t| !t.is_empty()) {
        out.push(Suggestion {
            text: format!("Summarize {ticker}'s forward guidance"),
            icon: "🎯",
        });
        out.push(Suggestion {
            text: format!("What drove {ticker}'s revenue last quarter?"),
            icon: "💹",
        });
        out.push(Suggestion {
            text: format!("Compare {ticker}'s capex vs. prior quarter"),
            icon: "🏗️",
        });
        if has_guidance {
            out.push(Suggestion {
                text: format!("What does management expect next quarter for {ticker}?"),
                icon: "🧭",
            });
        }
    }
    out.extend(BASE_SUGGESTIONS.iter().map(|(text, icon)| Suggestion {
        text: (*text).to_string(),
        icon: *icon,
    }));
    out
}

/// Chat context snapshot: a few metrics in key order.
pub fn snapshot_metrics(metrics: &[MetricValue], limit: usize) -> Vec<MetricValue> {
    let mut sorted = metrics.to_vec();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));
    sorted.truncate(limit);
    sorted
}

// ============================================================================
// Ingestion runs
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobFilter {
    #[default]
    All,
    IngestToday,
    RefreshNext14Days,
}

impl JobFilter {
    pub const ALL: [JobFilter; 3] = [JobFilter::All, JobFilter::IngestToday, JobFilter::RefreshNext14Days];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::IngestToday => "ingest_today",
            Self::RefreshNext14Days => "refresh_next_14_days",
        }
    }

    pub fn parse(raw: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == raw)
            .unwrap_or_default()
    }
}

pub fn filter_ingestion_runs(runs: &[IngestionRun], filter: JobFilter) -> Vec<IngestionRun> {
    runs.iter()
        .filter(|run| filter == JobFilter::All || run.job_type == filter.as_str())
        .cloned()
        .collect()
}

const DETAIL_TICKER_LIMIT: usize = 8;

pub fn ingestion_run_details(run: &IngestionRun) -> String {
    match JobFilter::parse(&run.job_type) {
        JobFilter::IngestToday => {
            let shown = run
                .tickers
                .iter()
                .take(DETAIL_TICKER_LIMIT)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            let hidden = run.tickers.len().saturating_sub(DETAIL_TICKER_LIMIT);
            if hidden > 0 {
                format!("{shown} +{hidden}")
            } else {
                shown
            }
        }
        JobFilter::RefreshNext14Days => {
            let range = run.range.clone().unwrap_or_default();
            let count = run
                .count
                .map_or_else(|| crate::PLACEHOLDER.to_string(), |c| c.to_string());
            format!("{} → {} ({count})", range.start, range.end)
        }
        JobFilter::All => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HighlightSummary, WatchItem};
    use chrono::TimeZone;

    fn event(id: &str, ticker: &str, date: &str, time: Option<&str>) -> CalendarEvent {
        CalendarEvent {
            id: id.to_string(),
            ticker: ticker.to_string(),
            company: None,
            event_date: date.to_string(),
            time_of_day: time.map(ToString::to_string),
            status: None,
        }
    }

    fn mover(ticker: &str, pct: Option<f64>) -> Mover {
        Mover {
            ticker: ticker.to_string(),
            company: None,
            price: None,
            change: None,
            change_percent: pct,
            direction: None,
        }
    }

    fn highlight(ticker: &str, score: Option<f64>, bullets: &[&str]) -> Highlight {
        Highlight {
            id: format!("h-{ticker}"),
            ticker: ticker.to_string(),
            company: Some(format!("{ticker} Inc")),
            summary: HighlightSummary {
                bullets: bullets.iter().map(ToString::to_string).collect(),
            },
            rank_score: score,
            created_at: "2024-05-01T00:00:00Z".to_string(),
        }
    }

    fn watchlist(tickers: &[&str]) -> Watchlist {
        Watchlist::from_items(tickers.iter().map(|t| WatchItem {
            id: String::new(),
            ticker: t.to_string(),
        }))
    }

    fn midnight(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn groups_by_time_of_day() {
        let events = vec![
            event("1", "AAA", "2024-05-02", Some("BMO")),
            event("2", "BBB", "2024-05-02", Some("amc")),
            event("3", "CCC", "2024-05-02", Some("XYZ")),
            event("4", "DDD", "2024-05-02", None),
        ];
        let groups = group_events_by_time_of_day(&events);
        assert_eq!(groups.bmo.len(), 1);
        assert_eq!(groups.bmo[0].id, "1");
        assert_eq!(groups.amc.len(), 1);
        assert_eq!(groups.amc[0].id, "2");
        let tbd: Vec<&str> = groups.tbd.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(tbd, vec!["3", "4"]);
    }

    #[test]
    fn next_event_includes_event_at_now() {
        let now = midnight(2024, 5, 2);
        let events = vec![
            event("yesterday", "AAA", "2024-05-01", None),
            event("today", "BBB", "2024-05-02", None),
            event("later", "CCC", "2024-05-05", None),
        ];
        assert_eq!(select_next_event(&events, now).map(|e| e.id.as_str()), Some("today"));
    }

    #[test]
    fn next_event_skips_past_timestamp_today() {
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 12, 0, 0).unwrap();
        let events = vec![
            event("yesterday", "AAA", "2024-05-01", None),
            event("today", "BBB", "2024-05-02T08:00:00Z", None),
            event("later", "CCC", "2024-05-05", None),
        ];
        assert_eq!(select_next_event(&events, now).map(|e| e.id.as_str()), Some("later"));
    }

    #[test]
    fn next_event_ties_keep_input_order_and_skip_garbage() {
        let now = midnight(2024, 5, 1);
        let events = vec![
            event("bad", "AAA", "not a date", None),
            event("first", "BBB", "2024-05-03", None),
            event("second", "CCC", "2024-05-03T00:00:00", None),
        ];
        assert_eq!(select_next_event(&events, now).map(|e| e.id.as_str()), Some("first"));
        assert!(select_next_event(&[], now).is_none());
    }

    #[test]
    fn week_bounds_start_on_monday() {
        let thursday = NaiveDate::from_ymd_opt(2024, 5, 2).unwrap();
        let sunday = NaiveDate::from_ymd_opt(2024, 5, 5).unwrap();
        let monday = NaiveDate::from_ymd_opt(2024, 4, 29).unwrap();
        assert_eq!(week_start(thursday), monday);
        assert_eq!(week_start(sunday), monday);
        assert_eq!(week_end(monday), sunday);
        assert_eq!(week_days(monday).len(), 7);
    }

    #[test]
    fn day_grouping_is_sorted() {
        let events = vec![
            event("1", "AAA", "2024-05-03", None),
            event("2", "BBB", "2024-05-01T13:00:00Z", None),
            event("3", "CCC", "garbage", None),
            event("4", "DDD", "2024-05-03", None),
        ];
        let days = group_events_by_day(&events);
        let keys: Vec<String> = days.keys().map(|d| d.to_string()).collect();
        assert_eq!(keys, vec!["2024-05-01", "2024-05-03"]);
        assert_eq!(days.values().map(Vec::len).sum::<usize>(), 3);

        let on_day = events_on_day(&events, NaiveDate::from_ymd_opt(2024, 5, 3).unwrap());
        assert_eq!(on_day.len(), 2);
    }

    #[test]
    fn trade_ideas_follow_priority() {
        let now = midnight(2024, 5, 1);
        let top = highlight("nvda", Some(0.7), &["Data center beat", "Guide raised"]);
        let movers = vec![mover("TSLA", Some(-3.0)), mover("AMD", Some(6.5)), mover("INTC", Some(-6.5))];
        let wl = watchlist(&["msft"]);
        let events = vec![
            event("1", "MSFT", "2024-05-08", Some("AMC")),
            event("2", "MSFT", "2024-05-03", Some("AMC")),
            event("3", "IBM", "2024-05-02", None),
        ];
        let next = select_next_event(&events, now);
        let ideas = derive_trade_ideas(&TradeIdeaInputs {
            top_highlight: Some(&top),
            movers: &movers,
            watchlist: &wl,
            events: &events,
            next_event: next,
            now,
        });

        assert_eq!(ideas.len(), 3);
        assert_eq!(ideas[0].title, "NVDA post-call setup");
        assert_eq!(ideas[0].confidence, Confidence::High);
        assert_eq!(ideas[0].thesis, "Data center beat");
        assert_eq!(ideas[0].catalyst.as_deref(), Some("Guide raised"));

        assert_eq!(ideas[1].ticker, "AMD");
        assert_eq!(ideas[1].confidence, Confidence::Medium);

        assert_eq!(ideas[2].ticker, "MSFT");
        assert_eq!(ideas[2].catalyst.as_deref(), Some("AMC call · May 3"));
    }

    #[test]
    fn trade_idea_confidence_bands() {
        let now = midnight(2024, 5, 1);
        let empty = Watchlist::default();
        let medium = highlight("AAA", None, &[]);
        let low = highlight("BBB", Some(0.2), &[]);
        for (h, expected) in [(&medium, Confidence::Medium), (&low, Confidence::Low)] {
            let ideas = derive_trade_ideas(&TradeIdeaInputs {
                top_highlight: Some(h),
                movers: &[],
                watchlist: &empty,
                events: &[],
                next_event: None,
                now,
            });
            assert_eq!(ideas[0].confidence, expected);
            assert_eq!(ideas[0].action, "Monitor for confirmation");
        }

        let small = vec![mover("CCC", None)];
        let ideas = derive_trade_ideas(&TradeIdeaInputs {
            top_highlight: None,
            movers: &small,
            watchlist: &empty,
            events: &[],
            next_event: None,
            now,
        });
        assert_eq!(ideas[0].confidence, Confidence::Low);
        assert_eq!(ideas[0].catalyst.as_deref(), Some("Market mover insight"));
    }

    #[test]
    fn trade_ideas_fall_back_and_dedupe() {
        let now = midnight(2024, 5, 1);
        let empty = Watchlist::default();
        let events = vec![event("1", "ibm", "2024-05-02", None)];
        let ideas = derive_trade_ideas(&TradeIdeaInputs {
            top_highlight: None,
            movers: &[],
            watchlist: &empty,
            events: &events,
            next_event: events.first(),
            now,
        });
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "IBM earnings watch");
        assert_eq!(ideas[0].catalyst.as_deref(), Some("2024-05-02"));

        let top = highlight("aapl", Some(0.9), &[]);
        let movers = vec![mover("AAPL", Some(9.0))];
        let ideas = derive_trade_ideas(&TradeIdeaInputs {
            top_highlight: Some(&top),
            movers: &movers,
            watchlist: &empty,
            events: &events,
            next_event: events.first(),
            now,
        });
        assert_eq!(ideas.len(), 1);
        assert_eq!(ideas[0].title, "AAPL post-call setup");
    }

    #[test]
    fn watchlist_upcoming_counts_future_only() {
        let now = midnight(2024, 5, 2);
        let wl = watchlist(&["aapl"]);
        let events = vec![
            event("1", "AAPL", "2024-05-01", None),
            event("2", "aapl", "2024-05-03", None),
            event("3", "MSFT", "2024-05-03", None),
        ];
        assert_eq!(watchlist_upcoming_count(&events, &wl, now), 1);
        assert_eq!(watchlist_upcoming_count(&events, &Watchlist::default(), now), 0);
    }

    #[test]
    fn alerts_cover_each_condition() {
        let prefs = AlertPrefs::default();
        let all_clear = derive_alerts(0, true, &prefs);
        assert_eq!(all_clear.len(), 1);
        assert_eq!(all_clear[0].label, "All clear");

        let muted = AlertPrefs {
            pre_market: false,
            post_market: false,
            notify_email: false,
            notify_in_app: false,
        };
        let alerts = derive_alerts(2, false, &muted);
        let labels: Vec<&str> = alerts.iter().map(|a| a.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["2 watchlist events this week", "No active context", "Notifications disabled"]
        );
        assert!(alerts[0].detail.starts_with("Enable alerts"));
    }

    #[test]
    fn movers_sort_modes() {
        let mut movers = vec![mover("msft", Some(1.0)), mover("AAPL", Some(-4.0)), mover("nvda", None)];
        sort_movers(&mut movers, MoverSort::Abs);
        let order: Vec<&str> = movers.iter().map(|m| m.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "msft", "nvda"]);

        let mut by_percent = movers.clone();
        sort_movers(&mut by_percent, MoverSort::Percent);
        assert_eq!(by_percent, movers);

        sort_movers(&mut movers, MoverSort::Ticker);
        let order: Vec<&str> = movers.iter().map(|m| m.ticker.as_str()).collect();
        assert_eq!(order, vec!["AAPL", "msft", "nvda"]);
    }

    #[test]
    fn suggestions_lead_with_context_ticker() {
        let base = context_suggestions(None, false);
        assert_eq!(base.len(), 6);

        let scoped = context_suggestions(Some("amzn"), true);
        assert_eq!(scoped.len(), 10);
        assert_eq!(scoped[0].text, "Summarize AMZN's forward guidance");
        assert_eq!(scoped[3].text, "What does management expect next quarter for AMZN?");
    }

    #[test]
    fn snapshot_takes_first_keys_alphabetically() {
        let metric = |key: &str| MetricValue {
            key: key.to_string(),
            name: key.to_string(),
            value: Some(1.0),
            unit: None,
            period: None,
            citations: Vec::new(),
        };
        let metrics = vec![metric("revenue"), metric("capex"), metric("eps_gaap")];
        let keys: Vec<String> = snapshot_metrics(&metrics, 2).into_iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["capex", "eps_gaap"]);
    }

    #[test]
    fn ingestion_details_by_job() {
        let ingest = IngestionRun {
            id: None,
            job_type: "ingest_today".to_string(),
            created_at: None,
            requested: Some(10),
            success: Some(9),
            count: None,
            error_count: Some(1),
            tickers: (1..=10).map(|i| format!("T{i}")).collect(),
            range: None,
        };
        assert_eq!(ingestion_run_details(&ingest), "T1, T2, T3, T4, T5, T6, T7, T8 +2");

        let refresh = IngestionRun {
            job_type: "refresh_next_14_days".to_string(),
            tickers: Vec::new(),
            count: Some(42),
            range: Some(crate::DateRange {
                start: "2024-05-01".to_string(),
                end: "2024-05-14".to_string(),
            }),
            ..ingest.clone()
        };
        assert_eq!(ingestion_run_details(&refresh), "2024-05-01 → 2024-05-14 (42)");

        let runs = vec![ingest, refresh];
        assert_eq!(filter_ingestion_runs(&runs, JobFilter::All).len(), 2);
        let only_refresh = filter_ingestion_runs(&runs, JobFilter::RefreshNext14Days);
        assert_eq!(only_refresh.len(), 1);
        assert_eq!(JobFilter::parse("bogus"), JobFilter::All);
    }
}
