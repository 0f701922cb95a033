//! Store-access sign-in.
//!
//! - `POST /api/identity/sign_in`: body `{"token": string|null}`. Returns the
//!   `StoreIdentity` whose `uid` the client sends as bearer token on every
//!   document request.

mod sign_in;

use actix_web::web::{post, scope};
use actix_web::Scope;

const API_PATH: &str = "/api/identity";

pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/sign_in", post().to(sign_in::process))
}
