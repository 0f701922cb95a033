//! # Store Sign-In Service
//!
//! Backend logic for `POST /api/identity/sign_in`. Issues the store-access identity whose
//! uid the client then presents on every document request.
//!
//! ## Workflow
//!
//! 1.  **Token Check**: A provisioned token signs in as the identity named by the token.
//!
//! 2.  **Anonymous Fallback**: Any other token, or none, gets a fresh anonymous uid. The
//!     registry keeping those uids is bounded and forgets idle ones, so clients sign in
//!     again when a request comes back `401`.

use crate::feed_controller::identity::IdentityState;
use actix_web::{web, HttpResponse, Responder};
use common::requests::SignInRequest;
use log::info;

/// Actix web handler for the sign-in endpoint.
///
/// # Arguments
/// * `identities` - Registry of issued store identities.
/// * `payload` - The optional provisioned token.
///
/// # Returns
/// - `200 OK` with the `StoreIdentity` as JSON. Sign-in itself never fails.
pub async fn process(
    identities: web::Data<IdentityState>,
    payload: web::Json<SignInRequest>,
) -> impl Responder {
    let identity = identities.sign_in(payload.token.as_deref()).await;
    if identity.anonymous {
        info!("anonymous store identity issued");
    } else {
        info!("provisioned store identity {} signed in", identity.uid);
    }
    HttpResponse::Ok().json(identity)
}
