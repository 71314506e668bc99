//! Configuration schema definitions.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Parameter keys the client always generates itself.
pub const MANDATED_PARAM_KEYS: [&str; 5] = [
    "page",
    "batchId",
    "scriptSessionId",
    "c0-scriptName",
    "c0-methodName",
];

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
}

/// DWR client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Address the `/dwr/call/plaincall/...` paths are appended to.
    #[serde(default)]
    pub base_url: String,

    /// Parameters sent with every call unless overridden per call.
    #[serde(default)]
    pub base_params: HashMap<String, String>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout. `0` disables it.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Config for `base_url` with every other field defaulted.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            base_params: HashMap::new(),
            connect_timeout_secs: default_connect_timeout(),
            timeout_secs: default_timeout(),
            user_agent: None,
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_timeout() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_empty());
        assert!(config.base_params.is_empty());
        assert_eq!(config.connect_timeout_secs, 10);
        assert_eq!(config.timeout_secs, 60);
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_with_base_url() {
        let config = ClientConfig::with_base_url("http://localhost:8080/app");
        assert_eq!(config.base_url, "http://localhost:8080/app");
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_timeouts() {
        let mut config = ClientConfig::default();
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.timeout(), Some(Duration::from_secs(60)));

        config.timeout_secs = 0;
        assert!(config.timeout().is_none());
    }

    #[test]
    fn test_config_deserialize_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.client.base_url.is_empty());
        assert_eq!(config.client.connect_timeout_secs, 10);
    }
}
