//! User-facing session gate.
//!
//! The session is unrelated to the store-access identity obtained at start
//! up (`store::StoreIdentity`): only an explicit, successful credential check
//! makes a session authenticated.

use crate::error::AuthError;
use uuid::Uuid;

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub authenticated: bool,
    /// Opaque token issued on login, `None` while logged out.
    pub identity: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Accepts exactly one literal credential pair.
pub fn check_credentials(username: &str, password: &str) -> Result<Session, AuthError> {
    if username == ADMIN_USERNAME && password == ADMIN_PASSWORD {
        Ok(Session {
            authenticated: true,
            identity: Some(Uuid::new_v4().to_string()),
        })
    } else {
        Err(AuthError::InvalidCredentials)
    }
}
