use std::rc::Rc;

use dioxus::prelude::*;
use earnings_types::{ContextStore, Watchlist, STORAGE_KEY_CHAT_DOCK_OPEN};

use super::styles::APP_STYLES;
use super::{ChatDock, Dashboard, Documents, Ingestion, Toasts};
use crate::effects::load_watchlist;
use crate::state::{use_app_state, AppState, ContextHandle};
use crate::storage::{listen_storage_events, read_flag, WebStorage};
use crate::theme::{apply_theme_to_document, initial_theme, set_cached_theme_preference};

#[derive(Routable, Clone, PartialEq, Debug)]
#[rustfmt::skip]
pub enum Route {
    #[layout(Shell)]
        #[route("/")]
        Dashboard {},
        #[route("/documents")]
        Documents {},
        #[route("/ingestion")]
        Ingestion {},
}

#[component]
pub fn App() -> Element {
    let context = use_hook(|| ContextHandle(Rc::new(ContextStore::load(WebStorage))));
    use_context_provider(|| context.clone());

    let active_doc = use_signal(|| context.0.get());
    let theme = use_signal(initial_theme);
    let chat_dock_open = use_signal(|| read_flag(STORAGE_KEY_CHAT_DOCK_OPEN));
    let toasts = use_signal(Vec::new);
    let watchlist = use_signal(Watchlist::default);

    use_context_provider(|| AppState {
        active_doc,
        toasts,
        chat_dock_open,
        theme,
        watchlist,
    });

    // Local writes and other tabs both arrive through the store's listeners.
    use_hook(|| {
        let store = context.0.clone();
        store.subscribe(move |change| {
            let mut active_doc = active_doc;
            active_doc.set(change.doc_id.clone());
        });
        listen_storage_events(move |key, new_value| {
            store.apply_external(key.as_deref(), new_value);
        });
    });

    use_effect(move || {
        apply_theme_to_document(theme());
    });

    use_effect(move || {
        spawn(load_watchlist(watchlist));
    });

    rsx! {
        Router::<Route> {}
    }
}

#[component]
fn Shell() -> Element {
    rsx! {
        style { {APP_STYLES} }
        div { class: "app-shell",
            Header {}
            main { class: "app-main",
                Outlet::<Route> {}
            }
            Toasts {}
            ChatDock {}
        }
    }
}

#[component]
fn Header() -> Element {
    let app = use_app_state();
    let mut theme = app.theme;
    let active_doc = app.active_doc;

    let toggle_theme = move |_| {
        let next = theme().toggle();
        theme.set(next);
        set_cached_theme_preference(next);
    };

    rsx! {
        header { class: "app-header",
            div { class: "row",
                span { class: "app-title", "Earnings" }
                nav { class: "app-nav",
                    Link { to: Route::Dashboard {}, active_class: "active", "Dashboard" }
                    Link { to: Route::Documents {}, active_class: "active", "Documents" }
                    Link { to: Route::Ingestion {}, active_class: "active", "Ingestion" }
                }
            }
            div { class: "row",
                match active_doc() {
                    Some(doc_id) => rsx! { span { class: "muted", title: "Active document", "Context: {doc_id}" } },
                    None => rsx! { span { class: "muted", "No context" } },
                }
                button {
                    class: "btn",
                    onclick: toggle_theme,
                    if theme().is_dark() { "Light mode" } else { "Dark mode" }
                }
            }
        }
    }
}
