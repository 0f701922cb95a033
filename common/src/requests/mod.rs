use serde::{Deserialize, Serialize};

/// Body of `POST /api/identity/sign_in`.
///
/// A provisioned token yields a named store identity; without one (or with
/// a token the server does not know) the server hands out an anonymous one.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub token: Option<String>,
}

/// Returned by the insert endpoint with the store-assigned document id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertResponse {
    pub id: String,
}
