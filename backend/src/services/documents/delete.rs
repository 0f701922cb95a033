//! # Document Deletion Service
//!
//! Backend logic for `DELETE /api/artifacts/{app_id}/public/data/{collection}/{id}`.
//!
//! ## Workflow
//!
//! 1.  **Authorization**: Bearer uid, path segments and the document id are validated.
//!
//! 2.  **Storage**: `Database::delete` removes the row and reports whether one existed.
//!
//! 3.  **Change Notice**: Only an actual removal is announced to the feed dispatcher, so
//!     deleting a missing id leaves every feed untouched.

use super::{authorize_partition, bearer, db_failure, DocumentPath};
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use crate::feed_controller::state::FeedState;
use actix_web::{web, HttpRequest, HttpResponse};
use log::info;

/// Actix web handler for the deletion endpoint. Deleting an id that does not
/// exist still succeeds.
///
/// # Arguments
/// * `req` - The request, read for its bearer uid.
/// * `db` - Shared handle to the SQLite database.
/// * `feeds` - Feed state used to announce the change.
/// * `identities` - Registry of issued store identities.
/// * `path` - The `app_id`, `collection` and `id` segments.
///
/// # Returns
/// - `200 OK` whether or not the document existed.
/// - `400 Bad Request` / `401 Unauthorized` as for the other document endpoints.
/// - `503 Service Unavailable` on a database error.
pub async fn process(
    req: HttpRequest,
    db: web::Data<Database>,
    feeds: web::Data<FeedState>,
    identities: web::Data<IdentityState>,
    path: web::Path<DocumentPath>,
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

    match db.delete(&partition, &path.id) {
        Ok(true) => {
            info!("deleted {} from {}", path.id, partition);
            feeds.announce(&partition).await;
            HttpResponse::Ok().finish()
        }
        Ok(false) => HttpResponse::Ok().finish(),
        Err(e) => db_failure("Error al eliminar documento", e),
    }
}
