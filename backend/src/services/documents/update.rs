//! # Document Update Service
//!
//! Backend logic for `PUT /api/artifacts/{app_id}/public/data/{collection}/{id}`. The stored
//! fields are replaced as a whole.
//!
//! ## Workflow
//!
//! 1.  **Authorization**: Bearer uid, path segments and the document id are validated.
//!
//! 2.  **Body Validation**: The payload must be a JSON object; its `id` field is dropped.
//!
//! 3.  **Storage**: `Database::update` overwrites the document, failing with `NotFound` when
//!     the id is not in the partition.
//!
//! 4.  **Change Notice**: On success the partition is announced to the feed dispatcher.

use super::{authorize_partition, bearer, db_failure, document_body, DocumentPath};
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use crate::feed_controller::state::FeedState;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;
use serde_json::Value;

/// Actix web handler for the update endpoint.
///
/// # Arguments
/// * `req` - The request, read for its bearer uid.
/// * `db` - Shared handle to the SQLite database.
/// * `feeds` - Feed state used to announce the change.
/// * `identities` - Registry of issued store identities.
/// * `path` - The `app_id`, `collection` and `id` segments.
/// * `payload` - The new document fields.
///
/// # Returns
/// - `200 OK` once the document is replaced.
/// - `404 Not Found` if no document has that id.
/// - `400 Bad Request` / `401 Unauthorized` as for the other document endpoints.
/// - `503 Service Unavailable` on a database error.
pub async fn process(
    req: HttpRequest,
    db: web::Data<Database>,
    feeds: web::Data<FeedState>,
    identities: web::Data<IdentityState>,
    path: web::Path<DocumentPath>,
    payload: web::Json<Value>,
) -> HttpResponse {
    let partition = match authorize_partition(
        bearer(&req),
        &identities,
        &path.app_id,
        &path.collection,
        Some(path.id.as_str()),
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

    match db.update(&partition, &path.id, &fields) {
        Ok(()) => {
            info!("updated {} in {}", path.id, partition);
            feeds.announce(&partition).await;
            HttpResponse::Ok().finish()
        }
        Err(e) => db_failure("Error al actualizar documento", e),
    }
}
