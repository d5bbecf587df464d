//! Active context driving a document panel, the way the chat panel wires it.

use std::cell::RefCell;
use std::rc::Rc;

use earnings_types::{
    normalize_guidance, normalize_metrics, or_empty, ApiError, ChangeOrigin, ContextPanel,
    ContextSnapshot, ContextStore, Document, GuidanceEntry, KeyValueStorage, LoadPhase,
    MemoryStorage, Ticket, STORAGE_KEY_DOC_ID,
};
use futures::channel::oneshot;
use futures::executor::block_on;
use serde_json::json;

struct Harness {
    store: ContextStore<Rc<MemoryStorage>>,
    storage: Rc<MemoryStorage>,
    panel: Rc<RefCell<ContextPanel<Vec<GuidanceEntry>>>>,
    issued: Rc<RefCell<Vec<(String, Ticket)>>>,
}

impl Harness {
    fn new() -> Self {
        let storage = Rc::new(MemoryStorage::new());
        let store = ContextStore::load(Rc::clone(&storage));
        let panel = Rc::new(RefCell::new(ContextPanel::new()));
        let issued = Rc::new(RefCell::new(Vec::new()));

        let sub_panel = Rc::clone(&panel);
        let sub_issued = Rc::clone(&issued);
        store.subscribe(move |change| {
            let ticket = sub_panel.borrow_mut().activate(change.doc_id.as_deref());
            if let (Some(ticket), Some(id)) = (ticket, change.doc_id.clone()) {
                sub_issued.borrow_mut().push((id, ticket));
            }
        });

        Self {
            store,
            storage,
            panel,
            issued,
        }
    }

    fn ticket_for(&self, doc_id: &str) -> Ticket {
        self.issued
            .borrow()
            .iter()
            .rev()
            .find(|(id, _)| id == doc_id)
            .map(|(_, t)| t.clone())
            .expect("ticket issued for doc")
    }
}

fn guidance_payload(metric: &str) -> serde_json::Value {
    json!({ "guidance": [{ "metric": metric, "value_low": 1.0, "value_high": 2.0 }] })
}

#[test]
fn switching_context_discards_the_slow_response() {
    let h = Harness::new();
    let (tx_a, rx_a) = oneshot::channel();
    let (tx_b, rx_b) = oneshot::channel();

    h.store.set("doc-a");
    h.store.set("doc-b");
    assert_eq!(h.panel.borrow().phase(), LoadPhase::Loading);
    assert_eq!(h.storage.get_item(STORAGE_KEY_DOC_ID).as_deref(), Some("doc-b"));

    tx_b.send(guidance_payload("revenue")).unwrap();
    tx_a.send(guidance_payload("capex")).unwrap();

    let b = normalize_guidance(&block_on(rx_b).unwrap());
    assert!(h.panel.borrow_mut().finish(&h.ticket_for("doc-b"), Ok(b)));

    let a = normalize_guidance(&block_on(rx_a).unwrap());
    assert!(!h.panel.borrow_mut().finish(&h.ticket_for("doc-a"), Ok(a)));

    let panel = h.panel.borrow();
    assert_eq!(panel.phase(), LoadPhase::Loaded);
    let entries = panel.data().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].metric.as_deref(), Some("revenue"));
}

#[test]
fn silent_guidance_failure_resets_to_empty() {
    let h = Harness::new();
    h.store.set("doc-a");
    let ok = normalize_guidance(&guidance_payload("revenue"));
    assert!(h.panel.borrow_mut().finish(&h.ticket_for("doc-a"), Ok(ok)));

    h.store.set("doc-b");
    let failed: Result<Vec<GuidanceEntry>, ApiError> = Err(ApiError::Timeout { millis: 20_000 });
    let swallowed = or_empty("guidance", failed);
    assert!(h.panel.borrow_mut().finish(&h.ticket_for("doc-b"), Ok(swallowed)));

    let panel = h.panel.borrow();
    assert_eq!(panel.phase(), LoadPhase::Loaded);
    assert!(panel.data().unwrap().is_empty());
}

#[test]
fn other_tab_clearing_storage_resets_panel() {
    let h = Harness::new();
    let origins = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&origins);
    h.store.subscribe(move |change| sink.borrow_mut().push(change.origin));

    h.store.set("doc-a");
    h.store.apply_external(None, None);

    assert_eq!(h.store.get(), None);
    assert_eq!(h.panel.borrow().phase(), LoadPhase::NoContext);
    assert_eq!(*origins.borrow(), vec![ChangeOrigin::Local, ChangeOrigin::External]);
}

#[test]
fn failed_snapshot_reload_keeps_document_and_metrics() {
    let storage = Rc::new(MemoryStorage::new());
    let store = ContextStore::load(Rc::clone(&storage));
    let mut panel = ContextPanel::<ContextSnapshot>::new();

    store.set("doc-a");
    let first = panel.activate(store.get().as_deref()).unwrap();
    let document: Document =
        serde_json::from_value(json!({ "doc_id": "doc-a", "ticker": "AAPL" })).unwrap();
    let metrics = json!({ "metrics": { "revenue": { "value": 94.9e9, "unit": "USD" } } });
    let loaded = ContextSnapshot {
        document: Some(document),
        metrics: normalize_metrics(&metrics),
        guidance: normalize_guidance(&guidance_payload("revenue")),
    };
    assert!(panel.finish_with(&first, Ok(loaded), ContextSnapshot::keep_after_failure));
    assert_eq!(panel.data().unwrap().guidance.len(), 1);

    // same document again, metrics endpoint down this time
    let retry = panel.activate(Some("doc-a")).unwrap();
    let failed = Err(ApiError::Http {
        status: 500,
        body: "metrics unavailable".to_string(),
    });
    assert!(panel.finish_with(&retry, failed, ContextSnapshot::keep_after_failure));

    assert_eq!(panel.phase(), LoadPhase::LoadFailed);
    assert_eq!(panel.error().unwrap().to_string(), "metrics unavailable");
    let kept = panel.data().unwrap();
    assert_eq!(kept.document.as_ref().map(|d| d.id.as_str()), Some("doc-a"));
    assert_eq!(kept.metrics.len(), 1);
    assert_eq!(kept.metrics[0].key, "revenue");
    assert_eq!(kept.metrics[0].value, Some(94.9e9));
    assert!(kept.guidance.is_empty());
}

#[test]
fn failure_before_any_load_has_nothing_to_keep() {
    let mut panel = ContextPanel::<ContextSnapshot>::new();
    let ticket = panel.activate(Some("doc-a")).unwrap();
    let failed = Err(ApiError::Timeout { millis: 20_000 });
    assert!(panel.finish_with(&ticket, failed, ContextSnapshot::keep_after_failure));
    assert_eq!(panel.phase(), LoadPhase::LoadFailed);
    assert!(panel.data().is_none());
}
