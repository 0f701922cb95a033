//! # Document Insertion Service
//!
//! Backend logic for `POST /api/artifacts/{app_id}/public/data/{collection}`.
//!
//! ## Workflow
//!
//! 1.  **Authorization**: The bearer uid and the path segments are checked as for every
//!     document endpoint.
//!
//! 2.  **Body Validation**: The payload must be a JSON object. An `id` field in it is
//!     discarded, since the server assigns ids.
//!
//! 3.  **Storage**: `Database::insert` stores the fields under a fresh uuid.
//!
//! 4.  **Change Notice**: The partition is announced to the feed dispatcher, so every open
//!     feed on it receives the new snapshot.
//!
//! 5.  **HTTP Response**: The assigned id is returned as an `InsertResponse`.

use super::{authorize_partition, bearer, db_failure, document_body, CollectionPath};
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use crate::feed_controller::state::FeedState;
use actix_web::{web, HttpRequest, HttpResponse};
use common::requests::InsertResponse;
use log::info;
use serde_json::Value;

/// Actix web handler for the insertion endpoint.
///
/// # Arguments
/// * `req` - The request, read for its bearer uid.
/// * `db` - Shared handle to the SQLite database.
/// * `feeds` - Feed state used to announce the change.
/// * `identities` - Registry of issued store identities.
/// * `path` - The `app_id` and `collection` segments.
/// * `payload` - The document fields.
///
/// # Returns
/// - `200 OK` with `{"id": ...}` on success.
/// - `400 Bad Request` for an invalid segment or a body that is not an object.
/// - `401 Unauthorized` for an unknown bearer uid.
/// - `503 Service Unavailable` if the insert fails.
pub async fn process(
    req: HttpRequest,
    db: web::Data<Database>,
    feeds: web::Data<FeedState>,
    identities: web::Data<IdentityState>,
    path: web::Path<CollectionPath>,
    payload: web::Json<Value>,
) -> HttpResponse {
    let partition = match authorize_partition(
        bearer(&req),
        &identities,
        &path.app_id,
        &path.collection,
        None,
    )
    .await
    {
        Ok(partition) => partition,
        Err(response) => return response,
    };
    let fields = match document_body(payload.into_inner()) {
        Ok(fields) => fields,
        Err(response) => return response,
    };

    match db.insert(&partition, &fields) {
        Ok(id) => {
            info!("inserted {} into {}", id, partition);
            feeds.announce(&partition).await;
            HttpResponse::Ok().json(InsertResponse { id })
        }
        Err(e) => db_failure("Error al insertar documento", e),
    }
}
