//! Boundary to the persistent document store.
//!
//! The store is schemaless: it deals in JSON objects grouped by partition.
//! Typing happens one level up, in `model::Record`. All futures are `!Send`
//! since the dashboard runs on a single browser thread.

mod memory;

use std::fmt;
use std::rc::Rc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::model::Document;

pub use memory::MemoryStore;

/// Namespaced location of one collection: `artifacts/{app_id}/public/data/{collection}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Partition {
    app_id: String,
    collection: String,
}

impl Partition {
    pub fn new(app_id: impl Into<String>, collection: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            collection: collection.into(),
        }
    }

    pub fn for_document<D: Document>(app_id: impl Into<String>) -> Self {
        Self::new(app_id, D::KIND.collection())
    }

    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "artifacts/{}/public/data/{}", self.app_id, self.collection)
    }
}

/// A document as the store returns it: its id plus arbitrary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Credential used to talk to the store. Not a user session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreIdentity {
    pub uid: String,
    pub anonymous: bool,
}

pub type SnapshotResult = Result<Vec<StoredDocument>, StoreError>;

/// Receives every snapshot of a subscribed partition.
pub type SnapshotSink = Rc<dyn Fn(SnapshotResult)>;

/// Handle on a live feed. The feed is released on `unsubscribe` or drop.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    pub fn unsubscribe(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[async_trait(?Send)]
pub trait RecordStore: Clone + 'static {
    /// Obtains a store-access identity, named when `token` is accepted and
    /// anonymous otherwise.
    async fn sign_in(&self, token: Option<&str>) -> Result<StoreIdentity, StoreError>;

    /// Opens a live feed. `sink` receives the full snapshot once right away
    /// and again after every committed change, in commit order.
    fn subscribe(&self, partition: &Partition, sink: SnapshotSink) -> Subscription;

    /// One-time read of the current snapshot.
    async fn fetch(&self, partition: &Partition) -> Result<Vec<StoredDocument>, StoreError>;

    /// Inserts a new document and returns the id the store assigned.
    async fn insert(
        &self,
        partition: &Partition,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError>;

    /// Overwrites an existing document entirely.
    async fn update(
        &self,
        partition: &Partition,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError>;

    /// Deletes by id. Deleting an unknown id succeeds.
    async fn delete(&self, partition: &Partition, id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Equipment, User};
    use std::cell::Cell;

    #[test]
    fn partition_path_is_namespaced_by_app() {
        assert_eq!(
            Partition::for_document::<Equipment>("demo").to_string(),
            "artifacts/demo/public/data/equipment"
        );
        assert_eq!(
            Partition::for_document::<User>("demo").collection(),
            "users"
        );
    }

    #[test]
    fn subscription_cancels_exactly_once() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let sub = Subscription::new(move || counter.set(counter.get() + 1));
        sub.unsubscribe();
        assert_eq!(calls.get(), 1);

        let counter = calls.clone();
        drop(Subscription::new(move || counter.set(counter.get() + 1)));
        assert_eq!(calls.get(), 2);
    }
}
