//! Document endpoints, one scope per store partition.
//!
//! A partition is addressed as `/api/artifacts/{app_id}/public/data/{collection}`:
//!
//! - `GET` on the partition returns its snapshot, oldest document first.
//! - `POST` inserts a document and returns `{"id": ...}`.
//! - `PUT .../{id}` overwrites a document; `404` when it does not exist.
//! - `DELETE .../{id}` removes a document; always `200`.
//! - `GET .../feed?auth={uid}` streams every snapshot as Server-Sent Events.
//!
//! Every call needs a store identity from `/api/identity/sign_in`, sent as
//! `Authorization: Bearer {uid}` (or as the `auth` query parameter for the
//! feed, since `EventSource` cannot set headers).

mod delete;
mod feed;
mod insert;
mod list;
mod update;

use crate::database::DbError;
use crate::feed_controller::identity::IdentityState;
use actix_web::http::header::AUTHORIZATION;
use actix_web::web::{delete, get, post, put, scope};
use actix_web::{HttpRequest, HttpResponse, Scope};
use common::store::Partition;
use log::error;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::OnceLock;

const API_PATH: &str = "/api/artifacts";

pub fn configure_routes() -> Scope {
    scope(API_PATH)
        .route("/{app_id}/public/data/{collection}", get().to(list::process))
        .route("/{app_id}/public/data/{collection}", post().to(insert::process))
        .route("/{app_id}/public/data/{collection}/feed", get().to(feed::process))
        .route("/{app_id}/public/data/{collection}/{id}", put().to(update::process))
        .route("/{app_id}/public/data/{collection}/{id}", delete().to(delete::process))
}

#[derive(Deserialize)]
pub struct CollectionPath {
    pub app_id: String,
    pub collection: String,
}

#[derive(Deserialize)]
pub struct DocumentPath {
    pub app_id: String,
    pub collection: String,
    pub id: String,
}

fn segment_pattern() -> &'static Regex {
    static SEGMENT: OnceLock<Regex> = OnceLock::new();
    SEGMENT.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("segment pattern compiles"))
}

pub(crate) fn valid_segment(segment: &str) -> bool {
    segment_pattern().is_match(segment)
}

fn bearer(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Checks the caller's store identity, then the path segments. Returns the
/// partition key the database uses, or the response to send instead.
pub(crate) async fn authorize_partition(
    uid: Option<&str>,
    identities: &IdentityState,
    app_id: &str,
    collection: &str,
    id: Option<&str>,
) -> Result<String, HttpResponse> {
    match uid {
        Some(uid) if identities.is_known(uid).await => {}
        _ => return Err(HttpResponse::Unauthorized().body("Identidad de acceso no válida")),
    }
    let segments = [Some(app_id), Some(collection), id];
    if let Some(bad) = segments.into_iter().flatten().find(|s| !valid_segment(s)) {
        return Err(HttpResponse::BadRequest().body(format!("Segmento no válido: {:?}", bad)));
    }
    Ok(Partition::new(app_id, collection).to_string())
}

/// Accepts only JSON objects; a client-supplied `id` never reaches storage.
pub(crate) fn document_body(body: Value) -> Result<Map<String, Value>, HttpResponse> {
    match body {
        Value::Object(mut fields) => {
            fields.remove("id");
            Ok(fields)
        }
        _ => Err(HttpResponse::BadRequest().body("El documento debe ser un objeto JSON")),
    }
}

pub(crate) fn db_failure(context: &str, e: DbError) -> HttpResponse {
    match e {
        DbError::NotFound(id) => HttpResponse::NotFound().body(format!("Documento {} no encontrado", id)),
        other => {
            error!("{}: {}", context, other);
            HttpResponse::ServiceUnavailable().body(format!("{}: {}", context, other))
        }
    }
}

#[cfg(test)]
mod tests;
