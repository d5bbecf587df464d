use earnings_types::{KeyValueStorage, Theme, STORAGE_KEY_DARK_MODE, STORAGE_KEY_THEME};

use crate::storage::{write_flag, write_item, WebStorage};

pub fn system_prefers_dark() -> bool {
    web_sys::window()
        .and_then(|w| w.match_media("(prefers-color-scheme: dark)").ok().flatten())
        .map(|query| query.matches())
        .unwrap_or(false)
}

/// Saved theme, else the documents page `darkMode` flag, else the OS preference.
pub fn initial_theme() -> Theme {
    if let Some(theme) = get_cached_theme_preference() {
        return theme;
    }
    let dark_flag = WebStorage.get_item(STORAGE_KEY_DARK_MODE);
    match dark_flag.as_deref() {
        Some("true") => Theme::Dark,
        Some("false") => Theme::Light,
        _ if system_prefers_dark() => Theme::Dark,
        _ => Theme::Light,
    }
}

pub fn get_cached_theme_preference() -> Option<Theme> {
    WebStorage
        .get_item(STORAGE_KEY_THEME)
        .and_then(|raw| Theme::parse(&raw))
}

/// Persists under both keys so `theme` and `darkMode` never disagree.
pub fn set_cached_theme_preference(theme: Theme) {
    write_item(STORAGE_KEY_THEME, theme.as_str());
    write_flag(STORAGE_KEY_DARK_MODE, theme.is_dark());
}

/// Toggle the `dark` class on `<html>` and mirror it in `data-theme`.
pub fn apply_theme_to_document(theme: Theme) {
    let Some(root) = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
    else {
        return;
    };

    let classes = root.class_list();
    let _ = if theme.is_dark() {
        classes.add_1("dark")
    } else {
        classes.remove_1("dark")
    };
    let _ = root.set_attribute("data-theme", theme.as_str());
}
