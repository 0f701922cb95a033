use thiserror::Error;

/// Failure of the hardcoded credential check.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Credenciales incorrectas.")]
    InvalidCredentials,
}

/// Any failed read or write against the persistent store.
///
/// Connectivity, permission and validation failures are not told apart:
/// they all surface as `Network` with the underlying message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("network error: {0}")]
    Network(String),
}

impl StoreError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Network(format!("invalid document: {}", err))
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown backend '{0}', expected 'http' or 'memory'")]
    UnknownBackend(String),
}
