use dioxus::prelude::*;
use earnings_types::STORAGE_KEY_CHAT_DOCK_OPEN;

use super::styles::CHAT_STYLES;
use super::ChatPanel;
use crate::state::use_app_state;
use crate::storage::write_flag;

/// Collapsible chat anchored to the bottom of every page. The open flag
/// survives reloads.
#[component]
pub fn ChatDock() -> Element {
    let app = use_app_state();
    let mut open = app.chat_dock_open;

    use_effect(move || {
        write_flag(STORAGE_KEY_CHAT_DOCK_OPEN, open());
    });

    rsx! {
        style { {CHAT_STYLES} }
        div { class: "chat-dock",
            button {
                class: "chat-dock-toggle",
                onclick: move |_| open.set(!open()),
                if open() { "▾ Ask" } else { "▴ Ask" }
            }
            if open() {
                ChatPanel {}
            }
        }
    }
}
