//! Client configuration.

use std::str::FromStr;

use crate::error::ConfigError;

pub const DEFAULT_APP_ID: &str = "default-app-id";

/// Which store implementation backs the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// The actix backend over HTTP and Server-Sent Events.
    #[default]
    Http,
    /// In-process sample data; nothing leaves the browser tab.
    Memory,
}

impl FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(BackendKind::Http),
            "memory" => Ok(BackendKind::Memory),
            other => Err(ConfigError::UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Parameterizes every partition path: `artifacts/{app_id}/public/data/...`.
    pub app_id: String,
    /// Token presented on silent store sign-in; anonymous when absent.
    pub provisioned_token: Option<String>,
    pub backend: BackendKind,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            provisioned_token: None,
            backend: BackendKind::default(),
        }
    }
}

impl AppConfig {
    /// Builds a configuration from optional raw values. Blank values fall
    /// back to the defaults.
    pub fn from_values(
        app_id: Option<&str>,
        provisioned_token: Option<&str>,
        backend: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let non_blank = |v: Option<&str>| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        Ok(Self {
            app_id: non_blank(app_id).unwrap_or_else(|| DEFAULT_APP_ID.to_string()),
            provisioned_token: non_blank(provisioned_token),
            backend: match non_blank(backend) {
                Some(kind) => kind.parse()?,
                None => BackendKind::default(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blanks_fall_back_to_defaults() {
        let config = AppConfig::from_values(Some("  "), Some(""), None).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn explicit_values_are_used() {
        let config = AppConfig::from_values(Some("inventario"), Some("tok"), Some("Memory")).unwrap();
        assert_eq!(config.app_id, "inventario");
        assert_eq!(config.provisioned_token.as_deref(), Some("tok"));
        assert_eq!(config.backend, BackendKind::Memory);
    }

    #[test]
    fn unknown_backend_is_rejected() {
        assert_eq!(
            AppConfig::from_values(None, None, Some("firebase")),
            Err(ConfigError::UnknownBackend("firebase".to_string()))
        );
    }
}
