pub mod api;
pub mod components;
pub mod config;
pub mod effects;
pub mod state;
pub mod storage;
pub mod theme;

pub use components::*;
pub use config::{config, ClientConfig};
pub use state::{use_app_state, use_context_handle, AppState, ContextHandle, Toast, ToastKind};
pub use storage::WebStorage;
