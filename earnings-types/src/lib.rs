//! Shared types for the earnings dashboard
//!
//! Everything here is browser-independent so it can be exercised by native
//! tests:
//! - wire records returned by the backend REST API
//! - normalization of the loosely-typed payloads (guidance, buybacks, metrics)
//! - derived views (calendar grouping, next event, trade ideas)
//! - the active-context store and the fetch failure policy

use serde::{Deserialize, Deserializer, Serialize};

pub mod context;
pub mod fetch;
pub mod format;
pub mod normalize;
pub mod prefs;
pub mod views;
pub mod watchlist;

pub use context::{ChangeOrigin, ContextChange, ContextStore, KeyValueStorage, MemoryStorage, StorageError, SubscriptionId};
pub use fetch::{load_calendar_with_refresh, or_empty, ApiError, ContextPanel, FailurePolicy, LoadPhase, RequestGuard, Ticket};
pub use format::{format_guidance_value, format_magnitude, format_percent, sparkline_points, PLACEHOLDER};
pub use normalize::{normalize_buybacks, normalize_guidance, normalize_list, normalize_metrics, normalize_series, safe_number};
pub use prefs::{AlertPref, AlertPrefs, Theme};
pub use views::*;
pub use watchlist::{Watchlist, WatchlistAction};

// ============================================================================
// Storage Keys
// ============================================================================

/// Active document id.
pub const STORAGE_KEY_DOC_ID: &str = "docId";
pub const STORAGE_KEY_DARK_MODE: &str = "darkMode";
pub const STORAGE_KEY_CHAT_DOCK_OPEN: &str = "chatDockOpen";
pub const STORAGE_KEY_ALERT_PREFS: &str = "earnings-alert-preferences";
pub const STORAGE_KEY_THEME: &str = "theme";

/// Uppercase, trimmed ticker used for every set/map lookup.
pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// ============================================================================
// Documents
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    #[serde(rename = "doc_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub chunk_count: i64,
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Document {
    /// Short label for pickers: filename, else ticker, else the id.
    pub fn label(&self) -> String {
        let name = self
            .filename
            .as_deref()
            .or(self.ticker.as_deref())
            .unwrap_or(self.id.as_str());
        format!("{name} ({} chunks)", self.chunk_count)
    }
}

/// Result of `/upload`, `/ingest_url` and `/ingest_symbol`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadResponse {
    pub doc_id: String,
    #[serde(default)]
    pub chunk_count: i64,
}

// ============================================================================
// Calendar
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeOfDay {
    Bmo,
    Amc,
    Unknown,
}

impl TimeOfDay {
    /// Case-insensitive exact match; anything else (including missing) is unknown.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::to_uppercase).as_deref() {
            Some("BMO") => Self::Bmo,
            Some("AMC") => Self::Amc,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Bmo => "BMO",
            Self::Amc => "AMC",
            Self::Unknown => "TBD",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarEvent {
    pub id: String,
    pub ticker: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub event_date: String,
    #[serde(default)]
    pub time_of_day: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl CalendarEvent {
    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_raw(self.time_of_day.as_deref())
    }
}

// ============================================================================
// Highlights & Summaries
// ============================================================================

/// Rank score assumed when the backend did not score a highlight.
pub const DEFAULT_RANK_SCORE: f64 = 0.5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct HighlightSummary {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Highlight {
    pub id: String,
    pub ticker: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: HighlightSummary,
    #[serde(default)]
    pub rank_score: Option<f64>,
    #[serde(default)]
    pub created_at: String,
}

impl Highlight {
    pub fn score(&self) -> f64 {
        self.rank_score
            .filter(|s| s.is_finite())
            .unwrap_or(DEFAULT_RANK_SCORE)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EpsSummaryItem {
    #[serde(default)]
    pub period: String,
    #[serde(default)]
    pub reported_eps: Option<f64>,
    #[serde(default)]
    pub estimated_eps: Option<f64>,
    #[serde(default)]
    pub surprise: Option<f64>,
    #[serde(default)]
    pub surprise_pct: Option<f64>,
    #[serde(default)]
    pub provider: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EarningsSummary {
    pub ticker: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub latest: Option<EpsSummaryItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub eps: Vec<EpsSummaryItem>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sources: Vec<String>,
}

// ============================================================================
// Market & Watchlist
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Mover {
    pub ticker: String,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub change: Option<f64>,
    #[serde(default)]
    pub change_percent: Option<f64>,
    #[serde(default)]
    pub direction: Option<String>,
}

impl Mover {
    /// Percent change with missing values counted as flat.
    pub fn percent(&self) -> f64 {
        self.change_percent.filter(|p| p.is_finite()).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchItem {
    #[serde(default)]
    pub id: String,
    pub ticker: String,
}

// ============================================================================
// Citations, Metrics, Guidance, Buybacks
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Citation {
    #[serde(default)]
    pub section: Option<String>,
    #[serde(default)]
    pub page: u32,
    pub snippet: String,
}

impl Citation {
    pub fn label(&self) -> String {
        format!(
            "[{}, p.{}] {}",
            self.section.as_deref().unwrap_or("N/A"),
            self.page,
            self.snippet
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricValue {
    /// Key in the backend's metrics map.
    pub key: String,
    pub name: String,
    pub value: Option<f64>,
    pub unit: Option<String>,
    pub period: Option<String>,
    pub citations: Vec<Citation>,
}

impl MetricValue {
    pub fn display_name(&self) -> String {
        let name = if self.name.is_empty() { &self.key } else { &self.name };
        name.replace('_', " ")
    }
}

/// Canonical guidance record, whichever wire shape it came from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GuidanceEntry {
    pub id: Option<String>,
    pub metric: Option<String>,
    pub period: Option<String>,
    pub value_low: Option<f64>,
    pub value_high: Option<f64>,
    pub value_point: Option<f64>,
    pub unit: Option<String>,
    pub outlook_note: Option<String>,
    pub confidence: Option<String>,
    pub detail: Option<String>,
    pub citations: Vec<Citation>,
}

impl GuidanceEntry {
    /// `METRIC · period`, whichever parts exist, else `Guidance`.
    pub fn title(&self) -> String {
        let parts: Vec<String> = [
            self.metric.as_deref().map(str::to_uppercase),
            self.period.clone(),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
        if parts.is_empty() {
            "Guidance".to_string()
        } else {
            parts.join(" · ")
        }
    }

    /// Outlook note, falling back to the free-form detail.
    pub fn note(&self) -> Option<&str> {
        self.outlook_note.as_deref().or(self.detail.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BuybackEntry {
    pub authorization_amount: Option<f64>,
    pub repurchased_amount: Option<f64>,
    pub unit: Option<String>,
    pub period: Option<String>,
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Series {
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<f64>,
}

// ============================================================================
// Q&A
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct QueryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_id: Option<String>,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerBullet {
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub citations: Vec<Citation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ChartData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct QueryResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub bullets: Vec<AnswerBullet>,
    #[serde(default)]
    pub chart: Option<ChartData>,
}

/// One question and its answer in a chat transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatExchange {
    pub question: String,
    pub answer: Vec<AnswerBullet>,
    pub chart: Option<ChartData>,
}

impl ChatExchange {
    pub fn new(question: impl Into<String>, response: QueryResponse) -> Self {
        Self {
            question: question.into(),
            answer: response.bullets,
            chart: response.chart.filter(|chart| !chart.values.is_empty()),
        }
    }
}

// ============================================================================
// Context snapshot
// ============================================================================

/// What the chat panel shows about the active document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextSnapshot {
    pub document: Option<Document>,
    pub metrics: Vec<MetricValue>,
    pub guidance: Vec<GuidanceEntry>,
}

impl ContextSnapshot {
    /// After a failed reload the document and metrics stay on screen; guidance
    /// is normalized on every load, so it starts over empty.
    pub fn keep_after_failure(&mut self) {
        self.guidance.clear();
    }
}

// ============================================================================
// Ingestion telemetry
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct DateRange {
    #[serde(default)]
    pub start: String,
    #[serde(default)]
    pub end: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionRun {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub job_type: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub requested: Option<i64>,
    #[serde(default)]
    pub success: Option<i64>,
    #[serde(default)]
    pub count: Option<i64>,
    #[serde(default)]
    pub error_count: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tickers: Vec<String>,
    #[serde(default)]
    pub range: Option<DateRange>,
}

/// Response of `/metrics/ingestion/last`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IngestionStatus {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub last_ingest: Option<IngestionRun>,
    #[serde(default)]
    pub last_refresh: Option<IngestionRun>,
}

/// Response of `/admin/ingest_today`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct IngestTodayResult {
    #[serde(default)]
    pub requested: Option<i64>,
    #[serde(default)]
    pub success: Option<i64>,
}

impl IngestTodayResult {
    pub fn message(&self) -> String {
        let show = |v: Option<i64>| v.map_or_else(|| "?".to_string(), |n| n.to_string());
        format!("Ingested {} of {} tickers", show(self.success), show(self.requested))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ticker_normalization() {
        assert_eq!(normalize_ticker(" aapl "), "AAPL");
        assert_eq!(normalize_ticker("Msft"), "MSFT");
    }

    #[test]
    fn test_time_of_day_is_case_insensitive() {
        assert_eq!(TimeOfDay::from_raw(Some("bmo")), TimeOfDay::Bmo);
        assert_eq!(TimeOfDay::from_raw(Some("AmC")), TimeOfDay::Amc);
        assert_eq!(TimeOfDay::from_raw(Some("XYZ")), TimeOfDay::Unknown);
        assert_eq!(TimeOfDay::from_raw(None), TimeOfDay::Unknown);
    }

    #[test]
    fn test_document_accepts_doc_id() {
        let doc: Document = serde_json::from_value(json!({
            "doc_id": "d-1",
            "chunk_count": 12,
            "ticker": "AAPL"
        }))
        .unwrap();
        assert_eq!(doc.id, "d-1");
        assert_eq!(doc.chunk_count, 12);
        assert_eq!(doc.label(), "AAPL (12 chunks)");
    }

    #[test]
    fn test_highlight_null_summary_defaults() {
        let h: Highlight = serde_json::from_value(json!({
            "id": "h1",
            "ticker": "NVDA",
            "summary": null,
            "created_at": "2024-05-01T00:00:00Z"
        }))
        .unwrap();
        assert!(h.summary.bullets.is_empty());
        assert_eq!(h.score(), DEFAULT_RANK_SCORE);
    }

    #[test]
    fn test_query_request_omits_missing_doc() {
        let req = QueryRequest {
            doc_id: None,
            question: "What changed?".to_string(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json, json!({ "question": "What changed?" }));
    }

    #[test]
    fn test_ingest_today_message() {
        let full = IngestTodayResult {
            requested: Some(10),
            success: Some(7),
        };
        assert_eq!(full.message(), "Ingested 7 of 10 tickers");
        assert_eq!(IngestTodayResult::default().message(), "Ingested ? of ? tickers");
    }

    #[test]
    fn test_ingestion_status_tolerates_disabled_db() {
        let status: IngestionStatus = serde_json::from_value(json!({ "enabled": false })).unwrap();
        assert!(!status.enabled);
        assert!(status.last_ingest.is_none());

        let status: IngestionStatus = serde_json::from_value(json!({
            "enabled": true,
            "last_ingest": {
                "id": 4,
                "job_type": "ingest_today",
                "requested": 10,
                "success": 8,
                "tickers": ["AAPL", "MSFT"]
            },
            "last_refresh": null
        }))
        .unwrap();
        let run = status.last_ingest.unwrap();
        assert_eq!(run.success, Some(8));
        assert_eq!(run.tickers, vec!["AAPL", "MSFT"]);
    }

    #[test]
    fn test_guidance_title() {
        let entry = GuidanceEntry {
            metric: Some("revenue".to_string()),
            period: Some("FY25".to_string()),
            ..Default::default()
        };
        assert_eq!(entry.title(), "REVENUE · FY25");
        assert_eq!(GuidanceEntry::default().title(), "Guidance");
        let period_only = GuidanceEntry {
            period: Some("Q3".to_string()),
            ..Default::default()
        };
        assert_eq!(period_only.title(), "Q3");
    }

    #[test]
    fn test_chat_exchange_drops_empty_chart() {
        let response: QueryResponse = serde_json::from_value(json!({
            "bullets": [{"text": "Revenue grew 12%", "citations": null}],
            "chart": {"labels": [], "values": []}
        }))
        .unwrap();
        let exchange = ChatExchange::new("How did revenue do?", response);
        assert_eq!(exchange.answer.len(), 1);
        assert!(exchange.answer[0].citations.is_empty());
        assert!(exchange.chart.is_none());
    }
}
