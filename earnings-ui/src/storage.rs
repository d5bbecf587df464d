//! localStorage access and the cross-tab `storage` event.

use dioxus_logger::tracing;
use earnings_types::{KeyValueStorage, StorageError};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::StorageEvent;

fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|window| window.local_storage().ok().flatten())
}

/// `window.localStorage`. Every operation degrades to a no-op when storage
/// is unavailable (private mode, sandboxed iframe).
#[derive(Debug, Clone, Copy, Default)]
pub struct WebStorage;

impl KeyValueStorage for WebStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        local_storage().and_then(|storage| storage.get_item(key).ok().flatten())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let storage = local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .set_item(key, value)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let storage = local_storage().ok_or(StorageError::Unavailable)?;
        storage
            .remove_item(key)
            .map_err(|e| StorageError::Write(format!("{e:?}")))
    }
}

/// `"true"` / `"false"` flags such as `darkMode` and `chatDockOpen`.
pub fn read_flag(key: &str) -> bool {
    WebStorage.get_item(key).as_deref() == Some("true")
}

pub fn write_flag(key: &str, value: bool) {
    if let Err(e) = WebStorage.set_item(key, if value { "true" } else { "false" }) {
        tracing::warn!(key, error = %e, "failed to persist flag");
    }
}

pub fn write_item(key: &str, value: &str) {
    if let Err(e) = WebStorage.set_item(key, value) {
        tracing::warn!(key, error = %e, "failed to persist preference");
    }
}

/// Forward `storage` events (fired for writes made by other tabs) as
/// `(key, new_value)`; a `None` key means the storage area was cleared.
pub fn listen_storage_events<F>(on_change: F)
where
    F: Fn(Option<String>, Option<String>) + 'static,
{
    let Some(window) = web_sys::window() else {
        return;
    };

    let handler = Closure::wrap(Box::new(move |event: StorageEvent| {
        on_change(event.key(), event.new_value());
    }) as Box<dyn FnMut(StorageEvent)>);

    if let Err(e) =
        window.add_event_listener_with_callback("storage", handler.as_ref().unchecked_ref())
    {
        tracing::warn!("failed to listen for storage events: {:?}", e);
        return;
    }

    // lives for the rest of the page
    handler.forget();
}
