use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Resolved adapter configuration.
///
/// The embedding host owns configuration parsing; this struct is what it
/// hands over. A config is immutable once a connection attempt has consumed
/// it — reloads replace it wholesale via
/// [`ConnectionManager::apply_config`](crate::ConnectionManager::apply_config).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Redis server hostname.
    #[serde(default = "default_host")]
    pub host: String,

    /// Redis server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database index selected after connecting. `0` means no SELECT is issued.
    #[serde(default)]
    pub database: u32,

    /// Password for AUTH. `None` or an empty string disables authentication.
    #[serde(default)]
    pub password: Option<String>,

    /// Connect timeout in seconds, also installed as the socket
    /// read/write timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    6379
}

fn default_timeout_secs() -> u64 {
    5
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: default_host(),
            port: default_port(),
            database: 0,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Rejects values no connection attempt could succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.is_empty() {
            return Err(ConfigError::Invalid("hostname must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be zero".into()));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeout must not be zero".into()));
        }
        Ok(())
    }

    /// `host:port` dial target.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The password to AUTH with, if authentication is enabled.
    pub fn auth_password(&self) -> Option<&str> {
        self.password.as_deref().filter(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 6379);
        assert_eq!(config.database, 0);
        assert_eq!(config.password, None);
        assert_eq!(config.timeout(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_host_is_invalid() {
        let config = Config {
            host: String::new(),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn zero_timeout_is_invalid() {
        let config = Config {
            timeout_secs: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn empty_password_disables_auth() {
        let mut config = Config::default();
        assert_eq!(config.auth_password(), None);
        config.password = Some(String::new());
        assert_eq!(config.auth_password(), None);
        config.password = Some("secret".to_string());
        assert_eq!(config.auth_password(), Some("secret"));
    }

    #[test]
    fn addr_joins_host_and_port() {
        let config = Config::default();
        assert_eq!(config.addr(), "127.0.0.1:6379");
    }

    #[test]
    fn deserializes_with_partial_fields() {
        let config: Config = serde_json::from_str(r#"{"host": "redis.internal"}"#).unwrap();
        assert_eq!(config.host, "redis.internal");
        assert_eq!(config.port, 6379);
        assert_eq!(config.timeout_secs, 5);
    }
}
