//! Fetch failure policy, request generations and per-panel load state.
//!
//! Transport lives in the UI crate; everything here is plain data so the
//! ordering rules can be tested without a browser.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("{}", http_message(.status, .body))]
    Http { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("request timed out after {millis} ms")]
    Timeout { millis: u32 },
    #[error("could not encode request: {0}")]
    Encode(String),
}

/// Non-2xx responses show the server's own message.
fn http_message(status: &u16, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        format!("HTTP {status}")
    } else {
        body.to_string()
    }
}

/// How a request failure reaches the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Background read: log and continue with the empty default.
    Silent,
    /// User action: hand the error back for display.
    Surface,
}

impl FailurePolicy {
    pub fn apply<T: Default>(self, what: &str, result: Result<T, ApiError>) -> Result<T, ApiError> {
        match (self, result) {
            (_, Ok(value)) => Ok(value),
            (Self::Silent, Err(e)) => {
                tracing::warn!(request = what, error = %e, "request failed, using empty result");
                Ok(T::default())
            }
            (Self::Surface, Err(e)) => {
                tracing::error!(request = what, error = %e, "request failed");
                Err(e)
            }
        }
    }
}

/// Shorthand for a `Silent` load.
pub fn or_empty<T: Default>(what: &str, result: Result<T, ApiError>) -> T {
    FailurePolicy::Silent
        .apply(what, result)
        .unwrap_or_default()
}

/// Monotonic generation counter; only the newest ticket may commit.
#[derive(Debug, Clone, Default)]
pub struct RequestGuard {
    latest: Arc<AtomicU64>,
}

#[derive(Debug, Clone)]
pub struct Ticket {
    generation: u64,
    latest: Arc<AtomicU64>,
}

impl RequestGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> Ticket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        Ticket {
            generation,
            latest: Arc::clone(&self.latest),
        }
    }

    /// Invalidate every outstanding ticket.
    pub fn cancel(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    NoContext,
    Loading,
    Loaded,
    LoadFailed,
}

/// Load state of one context-scoped panel (metrics, guidance, snapshot...).
#[derive(Debug, Clone)]
pub struct ContextPanel<T> {
    guard: RequestGuard,
    doc_id: Option<String>,
    phase: LoadPhase,
    data: Option<T>,
    error: Option<ApiError>,
}

impl<T> Default for ContextPanel<T> {
    fn default() -> Self {
        Self {
            guard: RequestGuard::new(),
            doc_id: None,
            phase: LoadPhase::NoContext,
            data: None,
            error: None,
        }
    }
}

impl<T> ContextPanel<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the panel at a new active id. Returns the ticket the caller must
    /// present with the result, or `None` when the context was cleared.
    pub fn activate(&mut self, doc_id: Option<&str>) -> Option<Ticket> {
        match doc_id.map(str::trim).filter(|id| !id.is_empty()) {
            None => {
                self.guard.cancel();
                self.doc_id = None;
                self.phase = LoadPhase::NoContext;
                self.data = None;
                self.error = None;
                None
            }
            Some(id) => {
                self.doc_id = Some(id.to_string());
                self.phase = LoadPhase::Loading;
                self.error = None;
                Some(self.guard.begin())
            }
        }
    }

    /// Commit a result. Returns false (and changes nothing) for a stale ticket.
    pub fn finish(&mut self, ticket: &Ticket, result: Result<T, ApiError>) -> bool {
        self.finish_with(ticket, result, |_| {})
    }

    /// Like [`finish`](Self::finish), but a failure also runs `on_failure`
    /// over the data kept from the previous load.
    pub fn finish_with<F>(&mut self, ticket: &Ticket, result: Result<T, ApiError>, on_failure: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        if !ticket.is_current() {
            tracing::debug!(
                generation = ticket.generation(),
                doc_id = ?self.doc_id,
                "discarding stale panel result"
            );
            return false;
        }
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                self.phase = LoadPhase::Loaded;
            }
            Err(e) => {
                if let Some(kept) = self.data.as_mut() {
                    on_failure(kept);
                }
                self.error = Some(e);
                self.phase = LoadPhase::LoadFailed;
            }
        }
        true
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn doc_id(&self) -> Option<&str> {
        self.doc_id.as_deref()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&ApiError> {
        self.error.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}

/// Calendar load: when the first response is empty, ask once more with
/// `refresh = true` so the backend pulls fresh data. Only the first request
/// can fail the load; a failed refresh leaves the calendar empty.
pub async fn load_calendar_with_refresh<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ApiError>
where
    F: FnMut(bool) -> Fut,
    Fut: Future<Output = Result<Vec<T>, ApiError>>,
{
    let events = fetch(false).await?;
    if !events.is_empty() {
        return Ok(events);
    }
    tracing::info!("calendar empty, retrying with refresh");
    Ok(or_empty("calendar refresh", fetch(true).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::channel::oneshot;
    use futures::executor::block_on;
    use std::cell::RefCell;

    #[test]
    fn http_error_shows_body() {
        let err = ApiError::Http {
            status: 400,
            body: "Ticker not found".to_string(),
        };
        assert_eq!(err.to_string(), "Ticker not found");
        let bare = ApiError::Http {
            status: 502,
            body: "  ".to_string(),
        };
        assert_eq!(bare.to_string(), "HTTP 502");
    }

    #[test]
    fn silent_policy_swallows() {
        let failed: Result<Vec<u32>, ApiError> = Err(ApiError::Transport("offline".into()));
        assert_eq!(FailurePolicy::Silent.apply("metrics", failed.clone()), Ok(Vec::new()));
        assert_eq!(or_empty("metrics", failed.clone()), Vec::<u32>::new());
        assert!(FailurePolicy::Surface.apply("upload", failed).is_err());
        assert_eq!(FailurePolicy::Surface.apply("upload", Ok(3)), Ok(3));
    }

    #[test]
    fn only_newest_ticket_is_current() {
        let guard = RequestGuard::new();
        let first = guard.begin();
        let second = guard.begin();
        assert!(!first.is_current());
        assert!(second.is_current());
        guard.cancel();
        assert!(!second.is_current());
    }

    #[test]
    fn panel_phases() {
        let mut panel: ContextPanel<Vec<u32>> = ContextPanel::new();
        assert_eq!(panel.phase(), LoadPhase::NoContext);

        let ticket = panel.activate(Some("doc-a")).unwrap();
        assert!(panel.is_loading());
        assert!(panel.finish(&ticket, Ok(vec![1, 2])));
        assert_eq!(panel.phase(), LoadPhase::Loaded);

        let ticket = panel.activate(Some("doc-b")).unwrap();
        assert!(panel.finish(&ticket, Err(ApiError::Timeout { millis: 20_000 })));
        assert_eq!(panel.phase(), LoadPhase::LoadFailed);
        // previous data survives a failed reload
        assert_eq!(panel.data(), Some(&vec![1, 2]));
        assert!(panel.error().is_some());

        assert!(panel.activate(None).is_none());
        assert_eq!(panel.phase(), LoadPhase::NoContext);
        assert!(panel.data().is_none());
    }

    #[test]
    fn delayed_result_for_old_context_is_dropped() {
        let mut panel: ContextPanel<&'static str> = ContextPanel::new();
        let (tx_a, rx_a) = oneshot::channel::<&'static str>();
        let (tx_b, rx_b) = oneshot::channel::<&'static str>();

        let ticket_a = panel.activate(Some("A")).unwrap();
        let ticket_b = panel.activate(Some("B")).unwrap();

        // B resolves first, then A arrives late
        tx_b.send("metrics for B").unwrap();
        tx_a.send("metrics for A").unwrap();

        let b = block_on(rx_b).unwrap();
        assert!(panel.finish(&ticket_b, Ok(b)));
        let a = block_on(rx_a).unwrap();
        assert!(!panel.finish(&ticket_a, Ok(a)));

        assert_eq!(panel.doc_id(), Some("B"));
        assert_eq!(panel.data(), Some(&"metrics for B"));
    }

    #[test]
    fn result_after_clear_is_dropped() {
        let mut panel: ContextPanel<u32> = ContextPanel::new();
        let ticket = panel.activate(Some("A")).unwrap();
        panel.activate(None);
        assert!(!panel.finish(&ticket, Ok(7)));
        assert_eq!(panel.phase(), LoadPhase::NoContext);
    }

    #[test]
    fn calendar_refreshes_once_when_empty() {
        let calls = RefCell::new(Vec::new());
        let events = block_on(load_calendar_with_refresh(|refresh| {
            calls.borrow_mut().push(refresh);
            async move {
                if refresh {
                    Ok(vec!["AAPL"])
                } else {
                    Ok(Vec::new())
                }
            }
        }))
        .unwrap();
        assert_eq!(events, vec!["AAPL"]);
        assert_eq!(*calls.borrow(), vec![false, true]);
    }

    #[test]
    fn calendar_skips_refresh_when_populated_or_failed() {
        let calls = RefCell::new(0);
        let events = block_on(load_calendar_with_refresh(|_| {
            *calls.borrow_mut() += 1;
            async { Ok(vec![1, 2]) }
        }))
        .unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(*calls.borrow(), 1);

        let failed = block_on(load_calendar_with_refresh(|_| async {
            Err::<Vec<u8>, _>(ApiError::Http {
                status: 500,
                body: "boom".into(),
            })
        }));
        assert_eq!(failed.unwrap_err().to_string(), "boom");
    }

    #[test]
    fn failed_refresh_leaves_calendar_empty() {
        let events = block_on(load_calendar_with_refresh(|refresh| async move {
            if refresh {
                Err(ApiError::Transport("offline".into()))
            } else {
                Ok(Vec::<u8>::new())
            }
        }));
        assert_eq!(events, Ok(Vec::new()));
    }
}
