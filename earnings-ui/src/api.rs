//! Backend REST client.
//!
//! Every call funnels through [`send`], which applies the request timeout and
//! maps transport, status and decode failures into [`ApiError`]. The
//! [`FailurePolicy`] of each endpoint decides whether a failure becomes an
//! empty result or reaches the caller.

use std::collections::BTreeMap;

use dioxus_logger::tracing;
use earnings_types::{
    load_calendar_with_refresh, normalize_buybacks, normalize_guidance, normalize_list,
    normalize_metrics, normalize_series, ApiError, BuybackEntry, CalendarEvent, Document,
    EarningsSummary, FailurePolicy, GuidanceEntry, Highlight, IngestTodayResult, IngestionRun,
    IngestionStatus, MetricValue, Mover, QueryRequest, QueryResponse, Series, UploadResponse,
    WatchItem,
};
use futures_util::future::{join, select, Either};
use gloo_net::http::{Request, Response};
use gloo_timers::future::TimeoutFuture;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};

use crate::config::config;

/// Metrics drawn as mini charts in the detail drawer.
pub const CHART_METRICS: [&str; 2] = ["revenue", "eps_gaap"];

fn url(path: &str) -> String {
    config().url(path)
}

fn encode_segment(segment: &str) -> String {
    String::from(js_sys::encode_uri_component(segment))
}

async fn read_body(response: Response) -> Result<Value, ApiError> {
    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::Http { status, body });
    }
    let text = response
        .text()
        .await
        .map_err(|e| ApiError::Transport(e.to_string()))?;
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Send one request, racing it against the configured timeout.
async fn send(what: &str, request: Result<Request, gloo_net::Error>) -> Result<Value, ApiError> {
    let request = request.map_err(|e| ApiError::Encode(e.to_string()))?;
    let millis = config().request_timeout_ms;

    let exchange = async move {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        read_body(response).await
    };

    match select(Box::pin(exchange), Box::pin(TimeoutFuture::new(millis))).await {
        Either::Left((result, _)) => result,
        Either::Right(_) => {
            tracing::warn!(request = what, millis, "request timed out");
            Err(ApiError::Timeout { millis })
        }
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

fn post_json<B: Serialize>(path: &str, body: &B) -> Result<Request, gloo_net::Error> {
    Request::post(&url(path)).json(body)
}

async fn get(what: &str, path: &str, policy: FailurePolicy) -> Result<Value, ApiError> {
    policy.apply(what, send(what, Request::get(&url(path)).build()).await)
}

async fn get_with_query(
    what: &str,
    path: &str,
    query: &[(&str, String)],
    policy: FailurePolicy,
) -> Result<Value, ApiError> {
    let request = Request::get(&url(path))
        .query(query.iter().map(|(k, v)| (*k, v.as_str())))
        .build();
    policy.apply(what, send(what, request).await)
}

async fn post_doc(what: &str, path: &str, doc_id: &str, policy: FailurePolicy) -> Result<Value, ApiError> {
    policy.apply(what, send(what, post_json(path, &json!({ "doc_id": doc_id }))).await)
}

// ============================================================================
// Documents
// ============================================================================

/// Multipart upload of the PDF picked in `input`.
pub async fn upload_document(file: web_sys::File) -> Result<UploadResponse, ApiError> {
    let form = web_sys::FormData::new().map_err(|e| ApiError::Encode(format!("{e:?}")))?;
    form.append_with_blob_and_filename("file", &file, &file.name())
        .map_err(|e| ApiError::Encode(format!("{e:?}")))?;

    let request = Request::post(&url("upload")).body(form);
    let value = FailurePolicy::Surface.apply("upload", send("upload", request).await)?;
    decode(value)
}

pub async fn ingest_url(url_to_ingest: &str, ticker: &str, company: Option<&str>) -> Result<UploadResponse, ApiError> {
    let body = json!({
        "url": url_to_ingest.trim(),
        "ticker": ticker,
        "company": company,
    });
    let value = FailurePolicy::Surface.apply("ingest_url", send("ingest_url", post_json("ingest_url", &body)).await)?;
    decode(value)
}

pub async fn ingest_symbol(ticker: &str) -> Result<UploadResponse, ApiError> {
    let body = json!({ "ticker": ticker, "prefer": "edgar" });
    let value = FailurePolicy::Surface
        .apply("ingest_symbol", send("ingest_symbol", post_json("ingest_symbol", &body)).await)?;
    decode(value)
}

pub async fn fetch_documents() -> Result<Vec<Document>, ApiError> {
    let value = get("docs", "docs", FailurePolicy::Surface).await?;
    Ok(normalize_list(&value))
}

pub async fn fetch_document(doc_id: &str, policy: FailurePolicy) -> Result<Option<Document>, ApiError> {
    let path = format!("docs/{}", encode_segment(doc_id));
    let value = get("doc", &path, policy).await?;
    if value.is_null() {
        return Ok(None);
    }
    policy.apply("doc", decode::<Document>(value).map(Some))
}

pub async fn fetch_documents_by_ticker(ticker: &str, policy: FailurePolicy) -> Result<Vec<Document>, ApiError> {
    let query = [("ticker", ticker.to_string())];
    let value = get_with_query("docs_by_ticker", "docs/list/by_ticker", &query, policy).await?;
    Ok(normalize_list(&value))
}

pub async fn delete_document(doc_id: &str) -> Result<(), ApiError> {
    let path = format!("docs/{}", encode_segment(doc_id));
    let request = Request::delete(&url(&path)).build();
    FailurePolicy::Surface
        .apply("delete_doc", send("delete_doc", request).await)
        .map(|_| ())
}

// ============================================================================
// Q&A and per-document analytics
// ============================================================================

pub async fn ask_question(doc_id: Option<&str>, question: &str) -> Result<QueryResponse, ApiError> {
    let body = QueryRequest {
        doc_id: doc_id.map(str::to_string),
        question: question.trim().to_string(),
    };
    let value = FailurePolicy::Surface.apply("query", send("query", post_json("query", &body)).await)?;
    decode(value)
}

pub async fn fetch_metrics(doc_id: &str, policy: FailurePolicy) -> Result<Vec<MetricValue>, ApiError> {
    let value = post_doc("metrics", "metrics", doc_id, policy).await?;
    Ok(normalize_metrics(&value))
}

pub async fn fetch_guidance(doc_id: &str) -> Vec<GuidanceEntry> {
    let value = post_doc("guidance", "guidance", doc_id, FailurePolicy::Silent).await;
    normalize_guidance(&value.unwrap_or_default())
}

pub async fn fetch_buybacks(doc_id: &str) -> Vec<BuybackEntry> {
    let value = post_doc("buybacks", "buybacks", doc_id, FailurePolicy::Silent).await;
    normalize_buybacks(&value.unwrap_or_default())
}

pub async fn fetch_series(doc_id: &str, metrics: &[&str]) -> BTreeMap<String, Series> {
    let body = json!({ "doc_id": doc_id, "metrics": metrics });
    let value = FailurePolicy::Silent
        .apply("series", send("series", post_json("series", &body)).await)
        .unwrap_or_default();
    normalize_series(&value)
}

// ============================================================================
// Calendar, highlights, summaries
// ============================================================================

pub async fn fetch_calendar(start: &str, end: &str, refresh: bool) -> Result<Vec<CalendarEvent>, ApiError> {
    let mut query = vec![("start", start.to_string()), ("end", end.to_string())];
    if refresh {
        query.push(("refresh", "1".to_string()));
    }
    let value = get_with_query("calendar", "earnings/calendar", &query, FailurePolicy::Surface).await?;
    Ok(normalize_list(&value))
}

/// Week calendar with the single `refresh=1` retry when the first answer is empty.
pub async fn load_calendar(start: &str, end: &str) -> Result<Vec<CalendarEvent>, ApiError> {
    load_calendar_with_refresh(|refresh| fetch_calendar(start, end, refresh)).await
}

pub async fn fetch_today_summaries(limit: u32, per_ticker: u32) -> Vec<EarningsSummary> {
    let query = [("limit", limit.to_string()), ("per_ticker", per_ticker.to_string())];
    let value = get_with_query("summaries", "earnings/summaries/today", &query, FailurePolicy::Silent)
        .await
        .unwrap_or_default();
    normalize_list(&value)
}

pub async fn fetch_ticker_highlights(ticker: &str) -> Vec<Highlight> {
    let path = format!("ticker/{}/highlights", encode_segment(ticker));
    let value = get("ticker_highlights", &path, FailurePolicy::Silent)
        .await
        .unwrap_or_default();
    normalize_list(&value)
}

/// Today's and this week's highlights, fetched together.
pub async fn fetch_highlights() -> (Vec<Highlight>, Vec<Highlight>) {
    let (today, week) = join(
        get("highlights_today", "highlights/today", FailurePolicy::Silent),
        get("highlights_week", "highlights/this_week", FailurePolicy::Silent),
    )
    .await;
    (
        normalize_list(&today.unwrap_or_default()),
        normalize_list(&week.unwrap_or_default()),
    )
}

// ============================================================================
// Watchlist & market
// ============================================================================

pub async fn fetch_watchlist() -> Vec<WatchItem> {
    let value = get("watchlist", "watchlist", FailurePolicy::Silent)
        .await
        .unwrap_or_default();
    normalize_list(&value)
}

pub async fn fetch_watchlist_events(start: &str, end: &str) -> Vec<CalendarEvent> {
    let query = [("start", start.to_string()), ("end", end.to_string())];
    let value = get_with_query("watchlist_events", "watchlist/events", &query, FailurePolicy::Silent)
        .await
        .unwrap_or_default();
    normalize_list(&value)
}

pub async fn add_to_watchlist(ticker: &str) -> Result<(), ApiError> {
    let path = format!("watchlist/{}", encode_segment(ticker));
    let request = Request::post(&url(&path)).build();
    FailurePolicy::Surface
        .apply("watchlist_add", send("watchlist_add", request).await)
        .map(|_| ())
}

pub async fn remove_from_watchlist(ticker: &str) -> Result<(), ApiError> {
    let path = format!("watchlist/{}", encode_segment(ticker));
    let request = Request::delete(&url(&path)).build();
    FailurePolicy::Surface
        .apply("watchlist_remove", send("watchlist_remove", request).await)
        .map(|_| ())
}

pub async fn fetch_market_movers(limit: u32, tickers: &[String]) -> Vec<Mover> {
    let mut query = vec![("limit", limit.to_string())];
    if !tickers.is_empty() {
        query.push(("tickers", tickers.join(",")));
    }
    let value = get_with_query("movers", "market/movers", &query, FailurePolicy::Silent)
        .await
        .unwrap_or_default();
    normalize_list(&value)
}

// ============================================================================
// Admin & ingestion telemetry
// ============================================================================

pub async fn ingest_today(limit: u32) -> Result<IngestTodayResult, ApiError> {
    let request = Request::post(&url("admin/ingest_today"))
        .query([("limit", limit.to_string())])
        .build();
    let value = FailurePolicy::Surface.apply("ingest_today", send("ingest_today", request).await)?;
    // counts are optional; anything unreadable still counts as a success
    Ok(serde_json::from_value(value).unwrap_or_default())
}

pub async fn fetch_last_ingestion() -> IngestionStatus {
    let value = get("ingestion_last", "metrics/ingestion/last", FailurePolicy::Silent)
        .await
        .unwrap_or_default();
    FailurePolicy::Silent
        .apply("ingestion_last", decode(value))
        .unwrap_or_default()
}

pub async fn fetch_recent_ingestion(limit: u32) -> Result<Vec<IngestionRun>, ApiError> {
    let query = [("limit", limit.to_string())];
    let value = get_with_query("ingestion_recent", "metrics/ingestion/recent", &query, FailurePolicy::Surface).await?;
    Ok(normalize_list(value.get("items").unwrap_or(&Value::Null)))
}
