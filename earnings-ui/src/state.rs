use std::rc::Rc;

use dioxus::core::spawn_forever;
use dioxus::prelude::*;
use earnings_types::{ContextStore, Theme, Watchlist};
use gloo_timers::future::TimeoutFuture;
use uuid::Uuid;

use crate::storage::WebStorage;

const TOAST_MILLIS: u32 = 1_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn class(self) -> &'static str {
        match self {
            Self::Info => "toast",
            Self::Success => "toast toast-success",
            Self::Error => "toast toast-error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: Uuid,
    pub message: String,
    pub kind: ToastKind,
}

/// Active-context store shared by every view. Writes go through the store;
/// views react to `AppState::active_doc`, which mirrors it.
#[derive(Clone)]
pub struct ContextHandle(pub Rc<ContextStore<WebStorage>>);

impl ContextHandle {
    pub fn set(&self, doc_id: &str) -> bool {
        self.0.set(doc_id)
    }

    pub fn clear(&self) {
        self.0.clear();
    }
}

/// App-wide signals, provided once by the root component.
#[derive(Clone, Copy)]
pub struct AppState {
    pub active_doc: Signal<Option<String>>,
    pub toasts: Signal<Vec<Toast>>,
    pub chat_dock_open: Signal<bool>,
    pub theme: Signal<Theme>,
    pub watchlist: Signal<Watchlist>,
}

pub fn use_app_state() -> AppState {
    use_context::<AppState>()
}

pub fn use_context_handle() -> ContextHandle {
    use_context::<ContextHandle>()
}

/// Show a toast for a short while.
pub fn push_toast(mut toasts: Signal<Vec<Toast>>, message: impl Into<String>, kind: ToastKind) {
    let id = Uuid::new_v4();
    toasts.write().push(Toast {
        id,
        message: message.into(),
        kind,
    });
    // Owned by the root scope so the timer outlives the view that raised it.
    spawn_forever(async move {
        TimeoutFuture::new(TOAST_MILLIS).await;
        dismiss_toast(&mut toasts.write(), id);
    });
}

pub fn dismiss_toast(toasts: &mut Vec<Toast>, id: Uuid) {
    toasts.retain(|toast| toast.id != id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_removes_only_the_matching_toast() {
        let keep = Toast {
            id: Uuid::new_v4(),
            message: "kept".to_string(),
            kind: ToastKind::Info,
        };
        let gone = Toast {
            id: Uuid::new_v4(),
            message: "gone".to_string(),
            kind: ToastKind::Error,
        };
        let mut toasts = vec![keep.clone(), gone.clone()];
        dismiss_toast(&mut toasts, gone.id);
        assert_eq!(toasts, vec![keep]);
    }

    #[test]
    fn toast_classes() {
        assert_eq!(ToastKind::Info.class(), "toast");
        assert_eq!(ToastKind::Success.class(), "toast toast-success");
        assert_eq!(ToastKind::Error.class(), "toast toast-error");
    }
}
