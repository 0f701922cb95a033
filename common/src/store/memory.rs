//! In-process store holding sample data in memory.
//!
//! Backs the dashboard's demo mode and every controller test. Snapshots are
//! delivered synchronously from inside the mutating call.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    Partition, RecordStore, SnapshotSink, StoreIdentity, StoredDocument, Subscription,
};
use crate::error::StoreError;

#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

#[derive(Default)]
struct Inner {
    partitions: HashMap<Partition, Vec<StoredDocument>>,
    listeners: HashMap<Partition, Vec<(u64, SnapshotSink)>>,
    next_listener: u64,
    offline: bool,
    /// Successful writes still allowed before every write fails.
    write_budget: Option<usize>,
    deletes_issued: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// While offline every operation fails with `StoreError::Network`.
    pub fn set_offline(&self, offline: bool) {
        self.inner.borrow_mut().offline = offline;
    }

    /// Lets `writes` more writes succeed, then fails all of them. `None`
    /// lifts the limit.
    pub fn fail_writes_after(&self, writes: Option<usize>) {
        self.inner.borrow_mut().write_budget = writes;
    }

    pub fn documents(&self, partition: &Partition) -> Vec<StoredDocument> {
        self.inner
            .borrow()
            .partitions
            .get(partition)
            .cloned()
            .unwrap_or_default()
    }

    pub fn listener_count(&self, partition: &Partition) -> usize {
        self.inner
            .borrow()
            .listeners
            .get(partition)
            .map_or(0, Vec::len)
    }

    /// Delete calls that reached the store, successful or not.
    pub fn deletes_issued(&self) -> usize {
        self.inner.borrow().deletes_issued
    }

    fn check_online(&self) -> Result<(), StoreError> {
        if self.inner.borrow().offline {
            Err(StoreError::network("store unreachable"))
        } else {
            Ok(())
        }
    }

    fn take_write(&self) -> Result<(), StoreError> {
        self.check_online()?;
        let mut inner = self.inner.borrow_mut();
        if let Some(left) = inner.write_budget.as_mut() {
            if *left == 0 {
                return Err(StoreError::network("write rejected"));
            }
            *left -= 1;
        }
        Ok(())
    }

    /// Pushes the current snapshot to every listener of `partition`. The
    /// borrow is released first so listeners may call back into the store.
    fn publish(&self, partition: &Partition) {
        let (snapshot, sinks) = {
            let inner = self.inner.borrow();
            let snapshot = inner.partitions.get(partition).cloned().unwrap_or_default();
            let sinks: Vec<SnapshotSink> = inner
                .listeners
                .get(partition)
                .map(|l| l.iter().map(|(_, sink)| sink.clone()).collect())
                .unwrap_or_default();
            (snapshot, sinks)
        };
        for sink in sinks {
            sink(Ok(snapshot.clone()));
        }
    }
}

fn remove_listener(inner: &Weak<RefCell<Inner>>, partition: &Partition, listener: u64) {
    if let Some(inner) = inner.upgrade() {
        let mut inner = inner.borrow_mut();
        if let Some(listeners) = inner.listeners.get_mut(partition) {
            listeners.retain(|(id, _)| *id != listener);
            if listeners.is_empty() {
                inner.listeners.remove(partition);
            }
        }
    }
}

#[async_trait(?Send)]
impl RecordStore for MemoryStore {
    async fn sign_in(&self, token: Option<&str>) -> Result<StoreIdentity, StoreError> {
        self.check_online()?;
        Ok(match token {
            Some(token) if !token.is_empty() => StoreIdentity {
                uid: token.to_string(),
                anonymous: false,
            },
            _ => StoreIdentity {
                uid: Uuid::new_v4().to_string(),
                anonymous: true,
            },
        })
    }

    fn subscribe(&self, partition: &Partition, sink: SnapshotSink) -> Subscription {
        let listener = {
            let mut inner = self.inner.borrow_mut();
            inner.next_listener += 1;
            let listener = inner.next_listener;
            inner
                .listeners
                .entry(partition.clone())
                .or_default()
                .push((listener, sink.clone()));
            listener
        };

        match self.check_online() {
            Ok(()) => sink(Ok(self.documents(partition))),
            Err(e) => sink(Err(e)),
        }

        let weak = Rc::downgrade(&self.inner);
        let partition = partition.clone();
        Subscription::new(move || remove_listener(&weak, &partition, listener))
    }

    async fn fetch(&self, partition: &Partition) -> Result<Vec<StoredDocument>, StoreError> {
        self.check_online()?;
        Ok(self.documents(partition))
    }

    async fn insert(
        &self,
        partition: &Partition,
        fields: Map<String, Value>,
    ) -> Result<String, StoreError> {
        self.take_write()?;
        let id = Uuid::new_v4().simple().to_string();
        self.inner
            .borrow_mut()
            .partitions
            .entry(partition.clone())
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                fields,
            });
        self.publish(partition);
        Ok(id)
    }

    async fn update(
        &self,
        partition: &Partition,
        id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        self.take_write()?;
        {
            let mut inner = self.inner.borrow_mut();
            let doc = inner
                .partitions
                .get_mut(partition)
                .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
                .ok_or_else(|| StoreError::network(format!("no document with id {}", id)))?;
            doc.fields = fields;
        }
        self.publish(partition);
        Ok(())
    }

    async fn delete(&self, partition: &Partition, id: &str) -> Result<(), StoreError> {
        self.inner.borrow_mut().deletes_issued += 1;
        self.take_write()?;
        if let Some(docs) = self.inner.borrow_mut().partitions.get_mut(partition) {
            docs.retain(|d| d.id != id);
        }
        self.publish(partition);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SnapshotResult;
    use serde_json::json;
    use std::cell::RefCell;

    fn body(sku: &str) -> Map<String, Value> {
        match json!({ "nombre": "Monitor", "tipo": "Monitor", "sede": "Sede Lima", "sku": sku }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    fn recording_sink() -> (SnapshotSink, Rc<RefCell<Vec<usize>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let sink: SnapshotSink = Rc::new(move |result: SnapshotResult| {
            log.borrow_mut().push(result.map(|docs| docs.len()).unwrap_or(usize::MAX));
        });
        (sink, seen)
    }

    #[tokio::test]
    async fn subscribers_get_initial_and_per_commit_snapshots() {
        let store = MemoryStore::new();
        let partition = Partition::new("app", "equipment");
        let (sink, seen) = recording_sink();

        let _sub = store.subscribe(&partition, sink);
        let id = store.insert(&partition, body("A")).await.unwrap();
        store.insert(&partition, body("B")).await.unwrap();
        store.delete(&partition, &id).await.unwrap();

        assert_eq!(*seen.borrow(), vec![0, 1, 2, 1]);
    }

    #[tokio::test]
    async fn other_partitions_are_not_delivered() {
        let store = MemoryStore::new();
        let (sink, seen) = recording_sink();
        let _sub = store.subscribe(&Partition::new("app", "users"), sink);

        store
            .insert(&Partition::new("app", "equipment"), body("A"))
            .await
            .unwrap();
        store
            .insert(&Partition::new("other", "users"), body("A"))
            .await
            .unwrap();

        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[tokio::test]
    async fn dropping_the_subscription_stops_delivery() {
        let store = MemoryStore::new();
        let partition = Partition::new("app", "equipment");
        let (sink, seen) = recording_sink();

        let sub = store.subscribe(&partition, sink);
        assert_eq!(store.listener_count(&partition), 1);
        sub.unsubscribe();
        assert_eq!(store.listener_count(&partition), 0);

        store.insert(&partition, body("A")).await.unwrap();
        assert_eq!(*seen.borrow(), vec![0]);
    }

    #[tokio::test]
    async fn update_of_unknown_id_fails_but_delete_succeeds() {
        let store = MemoryStore::new();
        let partition = Partition::new("app", "equipment");

        assert!(store.update(&partition, "missing", body("A")).await.is_err());
        assert!(store.delete(&partition, "missing").await.is_ok());
    }

    #[tokio::test]
    async fn sign_in_is_anonymous_without_a_token() {
        let store = MemoryStore::new();
        assert!(store.sign_in(None).await.unwrap().anonymous);

        let named = store.sign_in(Some("svc-token")).await.unwrap();
        assert!(!named.anonymous);
        assert_eq!(named.uid, "svc-token");
    }

    #[tokio::test]
    async fn offline_store_reports_network_errors() {
        let store = MemoryStore::new();
        let partition = Partition::new("app", "equipment");
        store.set_offline(true);

        let (sink, seen) = recording_sink();
        let _sub = store.subscribe(&partition, sink);
        assert_eq!(*seen.borrow(), vec![usize::MAX]);
        assert!(matches!(
            store.fetch(&partition).await,
            Err(StoreError::Network(_))
        ));
    }
}
