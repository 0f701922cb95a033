//! Initial data written into empty partitions.
//!
//! Seeding is a plain sequence of independent inserts: no transaction and no
//! idempotency key. If a write fails the remaining records are skipped and
//! whatever was already inserted stays; the next empty-check seeds again.

use log::{info, warn};

use crate::error::StoreError;
use crate::model::{Document, Equipment, Record, User};
use crate::store::{Partition, RecordStore};

/// The ten equipment records. `EQP010` appears twice in the original data
/// set and is kept as-is.
pub fn equipment() -> Vec<Equipment> {
    vec![
        Equipment::new("Laptop Lenovo ThinkPad", "Portátil", "Sede Lima", "EQP001"),
        Equipment::new("Laptop Lenovo ThinkPad", "Portátil", "Sede Arequipa", "EQP002"),
        Equipment::new("Laptop Dell Inspiron", "Portátil", "Sede Trujillo", "EQP003"),
        Equipment::new("Monitor Samsung 24\"", "Monitor", "Sede Lima", "EQP004"),
        Equipment::new("Monitor Samsung 24\"", "Monitor", "Sede Cusco", "EQP005"),
        Equipment::new("CPU HP ProDesk 400", "PC Escritorio", "Sede Lima", "EQP006"),
        Equipment::new("CPU HP ProDesk 400", "PC Escritorio", "Sede Piura", "EQP007"),
        Equipment::new("Impresora HP LaserJet", "Impresora", "Sede Lima", "EQP008"),
        Equipment::new("Impresora HP LaserJet", "Impresora", "Sede Chiclayo", "EQP010"),
        Equipment::new("Router TP-Link Archer", "Red", "Sede Lima", "EQP010"),
    ]
}

pub fn users() -> Vec<User> {
    vec![
        User::new("Juan Pérez", "juan.perez@example.com", "Administrador"),
        User::new("María García", "maria.garcia@example.com", "Editor"),
        User::new("Carlos Sánchez", "carlos.sanchez@example.com", "Usuario"),
    ]
}

/// Writes `D::seed()` into `partition` when a one-time fetch finds it empty.
///
/// Returns the number of records inserted (zero when the partition already
/// had documents).
pub async fn seed_if_empty<S, D>(store: &S, partition: &Partition) -> Result<usize, StoreError>
where
    S: RecordStore,
    D: Document,
{
    let existing = store.fetch(partition).await?;
    if !existing.is_empty() {
        return Ok(0);
    }

    let mut inserted = 0;
    for fields in D::seed() {
        let body = Record::new(fields).body()?;
        if let Err(e) = store.insert(partition, body).await {
            warn!(
                "Seeding {} stopped after {} records: {}",
                partition, inserted, e
            );
            return Err(e);
        }
        inserted += 1;
    }

    info!("Seeded {} records into {}", inserted, partition);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::collections::HashSet;

    #[test]
    fn ten_equipment_records_with_the_duplicate_sku() {
        let seed = equipment();
        assert_eq!(seed.len(), 10);

        let skus: HashSet<_> = seed.iter().map(|e| e.sku.as_str()).collect();
        assert_eq!(skus.len(), 9);
        assert_eq!(seed.iter().filter(|e| e.sku == "EQP010").count(), 2);
    }

    #[tokio::test]
    async fn empty_partition_gets_exactly_the_seed_set() {
        let store = MemoryStore::new();
        let partition = Partition::for_document::<Equipment>("app");

        let inserted = seed_if_empty::<_, Equipment>(&store, &partition)
            .await
            .unwrap();
        assert_eq!(inserted, 10);

        let stored: Vec<Equipment> = store
            .documents(&partition)
            .into_iter()
            .map(|doc| Record::<Equipment>::from_stored(doc).unwrap().fields)
            .collect();
        assert_eq!(stored, equipment());
    }

    #[tokio::test]
    async fn populated_partition_is_left_alone() {
        let store = MemoryStore::new();
        let partition = Partition::for_document::<Equipment>("app");
        let body = Record::new(Equipment::new("X", "Y", "Z", "W")).body().unwrap();
        store.insert(&partition, body).await.unwrap();

        let inserted = seed_if_empty::<_, Equipment>(&store, &partition)
            .await
            .unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.documents(&partition).len(), 1);
    }

    #[tokio::test]
    async fn failure_midway_leaves_a_partial_seed() {
        let store = MemoryStore::new();
        let partition = Partition::for_document::<Equipment>("app");
        store.fail_writes_after(Some(4));

        let result = seed_if_empty::<_, Equipment>(&store, &partition).await;
        assert!(matches!(result, Err(StoreError::Network(_))));
        assert_eq!(store.documents(&partition).len(), 4);

        // Not empty any more, so a second pass inserts nothing.
        store.fail_writes_after(None);
        let inserted = seed_if_empty::<_, Equipment>(&store, &partition)
            .await
            .unwrap();
        assert_eq!(inserted, 0);
    }
}
