//! Server configuration, read from `ADMIN_*` environment variables.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// SQLite file holding every partition.
    pub database: PathBuf,
    /// Tokens that sign in as a named (non-anonymous) store identity.
    pub provisioned_tokens: Vec<String>,
    pub open_browser: bool,
    /// Maximum accepted JSON body, in bytes.
    pub json_limit: usize,
    /// Anonymous store identities kept at once.
    pub identity_capacity: usize,
    /// Idle time after which an anonymous identity is forgotten.
    pub identity_ttl: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            database: PathBuf::from("equipment.sqlite"),
            provisioned_tokens: Vec::new(),
            open_browser: true,
            json_limit: 1024 * 1024,
            identity_capacity: crate::feed_controller::identity::DEFAULT_CAPACITY,
            identity_ttl: crate::feed_controller::identity::DEFAULT_TTL,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source; unset or blank
    /// variables keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = get("ADMIN_HOST") {
            config.host = host.trim().to_string();
        }
        if let Some(port) = get("ADMIN_PORT") {
            config.port = parse("ADMIN_PORT", &port)?;
        }
        if let Some(path) = get("ADMIN_DATABASE") {
            config.database = PathBuf::from(path);
        }
        if let Some(tokens) = get("ADMIN_PROVISIONED_TOKENS") {
            config.provisioned_tokens = tokens
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(open) = get("ADMIN_OPEN_BROWSER") {
            config.open_browser = match open.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "ADMIN_OPEN_BROWSER",
                        value: open,
                    })
                }
            };
        }
        if let Some(limit) = get("ADMIN_JSON_LIMIT") {
            config.json_limit = parse("ADMIN_JSON_LIMIT", &limit)?;
        }
        if let Some(capacity) = get("ADMIN_IDENTITY_CAPACITY") {
            config.identity_capacity = parse("ADMIN_IDENTITY_CAPACITY", &capacity)?;
        }
        if let Some(ttl) = get("ADMIN_IDENTITY_TTL_SECS") {
            config.identity_ttl = Duration::from_secs(parse("ADMIN_IDENTITY_TTL_SECS", &ttl)?);
        }

        Ok(config)
    }

    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}
