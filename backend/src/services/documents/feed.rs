//! Server-Sent Events feed of whole-partition snapshots.
//!
//! The first event carries the current snapshot. Afterwards each change to
//! the partition produces one event, `id:` being the partition version and
//! `data:` the snapshot as a single JSON line.

use super::{authorize_partition, db_failure, CollectionPath};
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use crate::feed_controller::state::{ChangeEvent, FeedState};
use actix_web::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use actix_web::web::{self, Bytes};
use actix_web::HttpResponse;
use common::store::StoredDocument;
use futures_util::stream::unfold;
use log::{error, info, warn};
use serde::Deserialize;
use tokio::sync::broadcast::{error::RecvError, Receiver};

#[derive(Deserialize)]
pub struct FeedQuery {
    pub auth: Option<String>,
}

pub(crate) fn encode_event(version: u64, documents: &[StoredDocument]) -> Result<Bytes, serde_json::Error> {
    let data = serde_json::to_string(documents)?;
    Ok(Bytes::from(format!("id: {}\ndata: {}\n\n", version, data)))
}

struct FeedCursor {
    partition: String,
    db: web::Data<Database>,
    feeds: web::Data<FeedState>,
    events: Receiver<ChangeEvent>,
    pending: Option<Bytes>,
}

impl FeedCursor {
    /// Waits for the next change to this partition. `None` once the
    /// dispatcher has shut down.
    async fn next_version(&mut self) -> Option<u64> {
        loop {
            match self.events.recv().await {
                Ok(event) if event.partition == self.partition => return Some(event.version),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("feed for {} skipped {} events, resyncing", self.partition, skipped);
                    return Some(self.feeds.version(&self.partition).await);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for FeedCursor {
    fn drop(&mut self) {
        info!("feed for {} closed", self.partition);
    }
}

/// Actix web handler for `GET .../{collection}/feed?auth={uid}`. `EventSource`
/// cannot send headers, so the uid travels percent-encoded in the query.
///
/// # Returns
/// - `200 OK` with a `text/event-stream` body that stays open.
/// - `401 Unauthorized` for an unknown uid, which browsers do not retry.
pub async fn process(
    db: web::Data<Database>,
    feeds: web::Data<FeedState>,
    identities: web::Data<IdentityState>,
    path: web::Path<CollectionPath>,
    query: web::Query<FeedQuery>,
) -> HttpResponse {
    let partition = match authorize_partition(
        query.auth.as_deref(),
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

    // Subscribe before reading so no commit falls between the two.
    let events = feeds.subscribe();
    let version = feeds.version(&partition).await;
    let first = match db.snapshot(&partition) {
        Ok(documents) => encode_event(version, &documents),
        Err(e) => return db_failure("Error al abrir el feed", e),
    };
    let first = match first {
        Ok(bytes) => bytes,
        Err(e) => return HttpResponse::InternalServerError().body(e.to_string()),
    };

    info!("feed for {} opened", partition);
    let cursor = FeedCursor {
        partition,
        db,
        feeds,
        events,
        pending: Some(first),
    };

    let stream = unfold(cursor, |mut cursor| async move {
        if let Some(first) = cursor.pending.take() {
            return Some((Ok::<_, actix_web::Error>(first), cursor));
        }
        let version = cursor.next_version().await?;
        let event = cursor
            .db
            .snapshot(&cursor.partition)
            .map_err(|e| e.to_string())
            .and_then(|documents| encode_event(version, &documents).map_err(|e| e.to_string()));
        match event {
            Ok(bytes) => Some((Ok(bytes), cursor)),
            Err(e) => {
                error!("feed for {} failed: {}", cursor.partition, e);
                None
            }
        }
    });

    HttpResponse::Ok()
        .insert_header((CONTENT_TYPE, "text/event-stream"))
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(stream)
}
