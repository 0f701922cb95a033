//! Store implementations the dashboard can run on.

mod http;

use async_trait::async_trait;
use common::config::BackendKind;
use common::error::StoreError;
use common::store::{
    MemoryStore, Partition, RecordStore, SnapshotSink, StoreIdentity, StoredDocument, Subscription,
};
use serde_json::{Map, Value};

pub use http::HttpStore;

/// Chosen once at startup from `AppConfig::backend`.
#[derive(Clone)]
pub enum AnyStore {
    Http(HttpStore),
    Memory(MemoryStore),
}

impl AnyStore {
    pub fn for_backend(kind: BackendKind) -> Self {
        match kind {
            BackendKind::Http => AnyStore::Http(HttpStore::new("")),
            BackendKind::Memory => AnyStore::Memory(MemoryStore::new()),
        }
    }
}

#[async_trait(?Send)]
impl RecordStore for AnyStore {
    async fn sign_in(&self, token: Option<&str>) -> Result<StoreIdentity, StoreError> {
        match self {
            AnyStore::Http(store) => store.sign_in(token).await,
            AnyStore::Memory(store) => store.sign_in(token).await,
        }
    }

    fn subscribe(&self, partition: &Partition, sink: SnapshotSink) -> Subscription {
        match self {
            AnyStore::Http(store) => store.subscribe(partition, sink),
            AnyStore::Memory(store) => store.subscribe(partition, sink),
        }
    }

    async fn fetch(&self, partition: &Partition) -> Result<Vec<StoredDocument>, StoreError> {
        match self {
            AnyStore::Http(store) => store.fetch(partition).await,
            AnyStore::Memory(store) => store.fetch(partition).await,
        }
    }

    async fn insert(
        &self,
        partition: &Partition,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError> {
        match self {
            AnyStore::Http(store) => store.insert(partition, fields).await,
            AnyStore::Memory(store) => store.insert(partition, fields).await,
        }
    }

    async fn update(
        &self,
        partition: &Partition,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        match self {
            AnyStore::Http(store) => store.update(partition, id, fields).await,
            AnyStore::Memory(store) => store.update(partition, id, fields).await,
        }
    }

    async fn delete(&self, partition: &Partition, id: &str) -> Result<(), StoreError> {
        match self {
            AnyStore::Http(store) => store.delete(partition, id).await,
            AnyStore::Memory(store) => store.delete(partition, id).await,
        }
    }
}
