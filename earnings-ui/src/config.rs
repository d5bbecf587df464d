//! Client configuration, fixed at build time.
//!
//! `EARNINGS_API_BASE_URL` and `EARNINGS_REQUEST_TIMEOUT_MS` are read with
//! `option_env!` when the wasm bundle is compiled; unset or unusable values
//! fall back to the defaults below.

use std::sync::OnceLock;

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 20_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_base: String,
    pub request_timeout_ms: u32,
}

impl ClientConfig {
    fn from_build_env() -> Self {
        Self::from_values(
            option_env!("EARNINGS_API_BASE_URL"),
            option_env!("EARNINGS_REQUEST_TIMEOUT_MS"),
        )
    }

    pub fn from_values(api_base: Option<&str>, timeout_ms: Option<&str>) -> Self {
        let api_base = api_base
            .map(|base| base.trim().trim_end_matches('/'))
            .filter(|base| !base.is_empty())
            .unwrap_or(DEFAULT_API_BASE)
            .to_string();

        let request_timeout_ms = timeout_ms
            .and_then(|raw| raw.trim().parse::<u32>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS);

        Self {
            api_base,
            request_timeout_ms,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }
}

static CONFIG: OnceLock<ClientConfig> = OnceLock::new();

pub fn config() -> &'static ClientConfig {
    CONFIG.get_or_init(ClientConfig::from_build_env)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_unset() {
        let cfg = ClientConfig::from_values(None, None);
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn trims_trailing_slashes_and_rejects_bad_timeouts() {
        let cfg = ClientConfig::from_values(Some("https://api.example.com/v1//"), Some("abc"));
        assert_eq!(cfg.api_base, "https://api.example.com/v1");
        assert_eq!(cfg.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
        assert_eq!(cfg.url("/docs"), "https://api.example.com/v1/docs");

        let cfg = ClientConfig::from_values(Some("  "), Some("0"));
        assert_eq!(cfg.api_base, DEFAULT_API_BASE);
        assert_eq!(cfg.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);

        assert_eq!(ClientConfig::from_values(None, Some("5000")).request_timeout_ms, 5000);
    }
}
