//! # Document Listing Service
//!
//! Backend logic for `GET /api/artifacts/{app_id}/public/data/{collection}`: a one-time
//! read of every document in a partition.
//!
//! ## Workflow
//!
//! 1.  **Authorization**: The bearer uid must belong to a live store identity and both path
//!     segments must be valid.
//!
//! 2.  **Database Query**: `Database::snapshot` returns the partition's documents in
//!     insertion order.
//!
//! 3.  **HTTP Response**: The documents are serialized as a JSON array of `StoredDocument`.

use super::{authorize_partition, bearer, db_failure, CollectionPath};
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use actix_web::{web, HttpRequest, HttpResponse};

/// Actix web handler for the listing endpoint.
///
/// # Arguments
/// * `req` - The request, read for its `Authorization: Bearer` header.
/// * `db` - Shared handle to the SQLite database.
/// * `identities` - Registry of issued store identities.
/// * `path` - The `app_id` and `collection` segments.
///
/// # Returns
/// - `200 OK` with the snapshot as a JSON array.
/// - `401 Unauthorized` if the bearer uid is missing or unknown.
/// - `400 Bad Request` if a path segment is not valid.
/// - `503 Service Unavailable` if the database cannot be read.
pub async fn process(
    req: HttpRequest,
    db: web::Data<Database>,
    identities: web::Data<IdentityState>,
    path: web::Path<CollectionPath>,
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

    match db.snapshot(&partition) {
        Ok(documents) => HttpResponse::Ok().json(documents),
        Err(e) => db_failure("Error al leer documentos", e),
    }
}
