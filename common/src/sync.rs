//! Local mirror of a store partition.
//!
//! A collection never merges: each delivered snapshot replaces the whole
//! sequence. Documents that fail to decode are skipped and logged.

use log::warn;

use crate::model::{CollectionKind, Document, Record};
use crate::store::{SnapshotResult, StoredDocument, Subscription};

/// A snapshot delivery tagged with the collection it belongs to.
#[derive(Debug)]
pub struct SnapshotEvent {
    pub kind: CollectionKind,
    /// Login counter of the session that opened the feed.
    pub generation: u64,
    pub result: SnapshotResult,
}

#[derive(Debug)]
pub struct RecordCollection<D> {
    records: Vec<Record<D>>,
    subscription: Option<Subscription>,
}

impl<D> Default for RecordCollection<D> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            subscription: None,
        }
    }
}

impl<D: Document> RecordCollection<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record<D>] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&Record<D>> {
        self.records.iter().find(|r| r.id.as_deref() == Some(id))
    }

    /// Whether a live feed is attached.
    pub fn is_live(&self) -> bool {
        self.subscription.is_some()
    }

    /// Attaches a feed, releasing any previous one.
    pub fn attach(&mut self, subscription: Subscription) {
        self.subscription = Some(subscription);
    }

    /// Replaces the contents with `snapshot`. Returns the new length.
    pub fn replace(&mut self, snapshot: Vec<StoredDocument>) -> usize {
        self.records = snapshot
            .into_iter()
            .filter_map(|doc| {
                let id = doc.id.clone();
                match Record::from_stored(doc) {
                    Ok(record) => Some(record),
                    Err(e) => {
                        warn!("Skipping {:?} document {}: {}", D::KIND, id, e);
                        None
                    }
                }
            })
            .collect();
        self.records.len()
    }

    /// Drops the feed and empties the collection.
    pub fn clear(&mut self) {
        self.subscription = None;
        self.records.clear();
    }
}
