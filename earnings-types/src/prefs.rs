//! Locally persisted user preferences.

use serde::{Deserialize, Serialize};

/// Alert toggles stored as JSON under `earnings-alert-preferences`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertPrefs {
    pub pre_market: bool,
    pub post_market: bool,
    pub notify_email: bool,
    pub notify_in_app: bool,
}

impl Default for AlertPrefs {
    fn default() -> Self {
        Self {
            pre_market: true,
            post_market: true,
            notify_email: false,
            notify_in_app: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertPref {
    PreMarket,
    PostMarket,
    NotifyEmail,
    NotifyInApp,
}

impl AlertPref {
    pub const ALL: [AlertPref; 4] = [
        AlertPref::PreMarket,
        AlertPref::PostMarket,
        AlertPref::NotifyInApp,
        AlertPref::NotifyEmail,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::PreMarket => "Pre-market (BMO)",
            Self::PostMarket => "Post-market (AMC)",
            Self::NotifyEmail => "Email",
            Self::NotifyInApp => "In-app",
        }
    }
}

impl AlertPrefs {
    /// Stored fields override the defaults; anything unreadable leaves the defaults.
    pub fn merge_json(raw: &str) -> Self {
        match serde_json::from_str::<Self>(raw) {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring unreadable alert preferences");
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn get(&self, pref: AlertPref) -> bool {
        match pref {
            AlertPref::PreMarket => self.pre_market,
            AlertPref::PostMarket => self.post_market,
            AlertPref::NotifyEmail => self.notify_email,
            AlertPref::NotifyInApp => self.notify_in_app,
        }
    }

    pub fn toggle(&mut self, pref: AlertPref) {
        let slot = match pref {
            AlertPref::PreMarket => &mut self.pre_market,
            AlertPref::PostMarket => &mut self.post_market,
            AlertPref::NotifyEmail => &mut self.notify_email,
            AlertPref::NotifyInApp => &mut self.notify_in_app,
        };
        *slot = !*slot;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }
}
