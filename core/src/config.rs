//! Client configuration.
//!
//! Defaults point at a game server on the local machine. `from_env` layers
//! `GAME_API_URL` and `GAME_API_LOGGING` over them. The request deadline is
//! fixed at `REQUEST_TIMEOUT` unless overridden in code.

use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(10_000);

pub const ENV_BASE_URL: &str = "GAME_API_URL";
pub const ENV_LOGGING: &str = "GAME_API_LOGGING";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Record every request and response to the client's log sink.
    pub logging_enabled: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: REQUEST_TIMEOUT,
            logging_enabled: false,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; `from_env` passes the process
    /// environment. Blank values are ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_BASE_URL).filter(|v| !v.trim().is_empty()) {
            config.base_url = url.trim().to_string();
        }
        if let Some(flag) = lookup(ENV_LOGGING) {
            config.logging_enabled = parse_flag(&flag);
        }
        config
    }

    pub fn with_logging(mut self, enabled: bool) -> Self {
        self.logging_enabled = enabled;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert!(!config.logging_enabled);
    }

    #[test]
    fn env_overrides_url_and_logging() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_BASE_URL, " https://cave.example.com/api "),
            (ENV_LOGGING, "TRUE"),
        ]));
        assert_eq!(config.base_url, "https://cave.example.com/api");
        assert!(config.logging_enabled);
        assert_eq!(config.timeout, REQUEST_TIMEOUT);
    }

    #[test]
    fn blank_url_keeps_default() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_BASE_URL, "  ")]));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn unrecognized_flag_disables_logging() {
        for raw in ["0", "false", "off", "maybe", ""] {
            let config = ClientConfig::from_lookup(lookup(&[(ENV_LOGGING, raw)]));
            assert!(!config.logging_enabled, "{raw:?}");
        }
        for raw in ["1", "yes", "On"] {
            let config = ClientConfig::from_lookup(lookup(&[(ENV_LOGGING, raw)]));
            assert!(config.logging_enabled, "{raw:?}");
        }
    }
}
