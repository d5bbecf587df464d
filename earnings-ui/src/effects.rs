use std::future::Future;

use chrono::NaiveDate;
use dioxus::prelude::{ReadableExt, Signal, WritableExt};
use dioxus_logger::tracing;
use earnings_types::{
    normalize_ticker, week_end, ApiError, CalendarEvent, ContextPanel, ContextSnapshot,
    EarningsSummary, FailurePolicy, Highlight, IngestionStatus, Watchlist, WatchlistAction,
};
use futures_util::future::join3;

use crate::api;
use crate::state::{push_toast, AppState, ContextHandle, ToastKind};

/// Guidance entries shown in compact views.
pub const GUIDANCE_PREVIEW: usize = 6;

/// Run `load` for the panel's new active id and commit the result only if no
/// newer id was activated in the meantime.
pub async fn load_panel<T, F, Fut>(panel: Signal<ContextPanel<T>>, doc_id: Option<String>, load: F)
where
    T: 'static,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    load_panel_with(panel, doc_id, load, |_| {}).await;
}

/// [`load_panel`] with a hook over the previous data when the load fails.
pub async fn load_panel_with<T, F, Fut, K>(
    mut panel: Signal<ContextPanel<T>>,
    doc_id: Option<String>,
    load: F,
    on_failure: K,
) where
    T: 'static,
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
    K: FnOnce(&mut T),
{
    let ticket = panel.write().activate(doc_id.as_deref());
    let (Some(ticket), Some(doc_id)) = (ticket, doc_id) else {
        return;
    };
    let result = load(doc_id).await;
    panel.write().finish_with(&ticket, result, on_failure);
}

/// Document meta, metrics and a guidance preview for the chat context.
/// Meta and metrics failures fail the load; guidance is a background read.
pub async fn load_context_snapshot(doc_id: String) -> Result<ContextSnapshot, ApiError> {
    let (document, metrics, mut guidance) = join3(
        api::fetch_document(&doc_id, FailurePolicy::Surface),
        api::fetch_metrics(&doc_id, FailurePolicy::Surface),
        api::fetch_guidance(&doc_id),
    )
    .await;
    guidance.truncate(GUIDANCE_PREVIEW);
    Ok(ContextSnapshot {
        document: document?,
        metrics: metrics?,
        guidance,
    })
}

pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub async fn load_week_events(
    week_start: NaiveDate,
    mut events: Signal<Vec<CalendarEvent>>,
    mut loading: Signal<bool>,
    mut error: Signal<Option<String>>,
) {
    loading.set(true);
    error.set(None);
    let start = iso_date(week_start);
    let end = iso_date(week_end(week_start));
    match api::load_calendar(&start, &end).await {
        Ok(list) => events.set(list),
        Err(e) => error.set(Some(e.to_string())),
    }
    loading.set(false);
}

pub async fn load_highlights(
    mut today: Signal<Vec<Highlight>>,
    mut week: Signal<Vec<Highlight>>,
    mut loading: Signal<bool>,
) {
    loading.set(true);
    let (t, w) = api::fetch_highlights().await;
    today.set(t);
    week.set(w);
    loading.set(false);
}

pub async fn load_summaries(mut summaries: Signal<Vec<EarningsSummary>>, mut loading: Signal<bool>) {
    loading.set(true);
    summaries.set(api::fetch_today_summaries(12, 4).await);
    loading.set(false);
}

pub async fn load_ingestion_status(mut status: Signal<IngestionStatus>) {
    status.set(api::fetch_last_ingestion().await);
}

pub async fn load_watchlist(mut watchlist: Signal<Watchlist>) {
    let items = api::fetch_watchlist().await;
    watchlist.set(Watchlist::from_items(items));
}

/// Server first; the local set changes only once the call succeeded.
/// Callers spawn this with `spawn_forever` so closing the view mid-request
/// cannot drop the commit.
pub async fn toggle_watchlist(app: AppState, ticker: String) {
    let Some(action) = app.watchlist.read().plan_toggle(&ticker) else {
        return;
    };
    let result = match &action {
        WatchlistAction::Add(t) => api::add_to_watchlist(t).await,
        WatchlistAction::Remove(t) => api::remove_from_watchlist(t).await,
    };
    let mut watchlist = app.watchlist;
    watchlist.write().settle(&action, &result);
    if let Err(e) = result {
        push_toast(app.toasts, e.to_string(), ToastKind::Error);
    }
}

/// Use the newest document for `ticker` as the active context and open the chat.
pub async fn set_context_for_ticker(app: AppState, context: ContextHandle, ticker: String) {
    let ticker = normalize_ticker(&ticker);
    if ticker.is_empty() {
        return;
    }
    match api::fetch_documents_by_ticker(&ticker, FailurePolicy::Surface).await {
        Ok(docs) => match docs.first() {
            Some(doc) => {
                context.set(&doc.id);
                let mut dock = app.chat_dock_open;
                dock.set(true);
                push_toast(app.toasts, format!("Context set: {ticker}"), ToastKind::Success);
            }
            None => push_toast(app.toasts, format!("No document found for {ticker}"), ToastKind::Info),
        },
        Err(e) => {
            tracing::warn!(%ticker, error = %e, "set context failed");
            push_toast(app.toasts, e.to_string(), ToastKind::Error);
        }
    }
}
