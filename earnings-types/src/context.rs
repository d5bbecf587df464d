//! Active document context.
//!
//! A single process-wide "current document" id, persisted under `docId`, that
//! the chat panel, drawer and dock all read. Changes made here and changes
//! observed from other tabs go through the same notification path.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::STORAGE_KEY_DOC_ID;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage write rejected: {0}")]
    Write(String),
}

/// Minimal string key/value persistence (browser localStorage in the app).
pub trait KeyValueStorage {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory storage. Writes can be made to fail for exercising error paths.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
    reject_writes: Cell<bool>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reject_writes(&self, reject: bool) {
        self.reject_writes.set(reject);
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Write(format!("quota exceeded for {key}")));
        }
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        if self.reject_writes.get() {
            return Err(StorageError::Unavailable);
        }
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Rc<T> {
    fn get_item(&self, key: &str) -> Option<String> {
        (**self).get_item(key)
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set_item(key, value)
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove_item(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// `set` or `clear` in this tab.
    Local,
    /// Storage change observed from another tab.
    External,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextChange {
    pub doc_id: Option<String>,
    pub origin: ChangeOrigin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Rc<dyn Fn(&ContextChange)>;

pub struct ContextStore<S> {
    storage: S,
    current: RefCell<Option<String>>,
    listeners: RefCell<Vec<(SubscriptionId, Listener)>>,
    next_id: Cell<u64>,
}

fn clean_id(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl<S: KeyValueStorage> ContextStore<S> {
    /// Restore the persisted id, if any.
    pub fn load(storage: S) -> Self {
        let current = storage.get_item(STORAGE_KEY_DOC_ID).and_then(|raw| clean_id(&raw));
        Self {
            storage,
            current: RefCell::new(current),
            listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(0),
        }
    }

    pub fn get(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    /// Make `doc_id` the active context. Blank ids are rejected (returns false).
    /// Subscribers hear about it only when the value actually changes.
    pub fn set(&self, doc_id: &str) -> bool {
        let Some(id) = clean_id(doc_id) else {
            tracing::warn!("ignoring blank context id");
            return false;
        };
        if let Err(e) = self.storage.set_item(STORAGE_KEY_DOC_ID, &id) {
            tracing::warn!(error = %e, "failed to persist context");
        }
        self.replace(Some(id), ChangeOrigin::Local);
        true
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove_item(STORAGE_KEY_DOC_ID) {
            tracing::warn!(error = %e, "failed to clear persisted context");
        }
        self.replace(None, ChangeOrigin::Local);
    }

    /// Feed a storage event from another tab. `key == None` means the whole
    /// storage area was cleared.
    pub fn apply_external(&self, key: Option<&str>, new_value: Option<String>) {
        let next = match key {
            Some(STORAGE_KEY_DOC_ID) => new_value.as_deref().and_then(clean_id),
            Some(_) => return,
            None => None,
        };
        self.replace(next, ChangeOrigin::External);
    }

    pub fn subscribe(&self, listener: impl Fn(&ContextChange) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get());
        self.next_id.set(self.next_id.get() + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.borrow_mut().retain(|(sub, _)| *sub != id);
    }

    fn replace(&self, next: Option<String>, origin: ChangeOrigin) {
        if *self.current.borrow() == next {
            return;
        }
        *self.current.borrow_mut() = next.clone();
        tracing::debug!(doc_id = ?next, ?origin, "context changed");

        let change = ContextChange { doc_id: next, origin };
        // listeners may subscribe or unsubscribe while being notified
        let listeners: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, l)| Rc::clone(l))
            .collect();
        for listener in listeners {
            listener(&change);
        }
    }
}
