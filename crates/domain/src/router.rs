//! Router configuration payload handed to router-facing collaborators.

use serde::{Deserialize, Serialize};
use std::time::Duration;

const MIN_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Normalized router connection settings from the add-on options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub host: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub ssl: bool,
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default)]
    pub poll_interval_sec: u64,
}

impl RouterConfig {
    /// Polling interval with a 5-second floor.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        let interval = Duration::from_secs(self.poll_interval_sec);
        interval.max(MIN_POLL_INTERVAL)
    }

    /// REST API base URL derived from host and TLS setting.
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{scheme}://{}/rest", self.host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_enforce_minimum_poll_interval() {
        let config = RouterConfig {
            poll_interval_sec: 1,
            ..RouterConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn should_keep_configured_poll_interval_above_floor() {
        let config = RouterConfig {
            poll_interval_sec: 30,
            ..RouterConfig::default()
        };
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
    }

    #[test]
    fn should_build_http_base_url() {
        let config = RouterConfig {
            host: "router.local".to_string(),
            ..RouterConfig::default()
        };
        assert_eq!(config.base_url(), "http://router.local/rest");
    }

    #[test]
    fn should_build_https_base_url_when_ssl_enabled() {
        let config = RouterConfig {
            host: "router.local".to_string(),
            ssl: true,
            ..RouterConfig::default()
        };
        assert_eq!(config.base_url(), "https://router.local/rest");
    }
}
