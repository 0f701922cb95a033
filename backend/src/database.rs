//! SQLite-backed document storage.
//!
//! Every partition lives in one `documents` table, keyed by the partition
//! path and a generated id. Bodies are stored as JSON text. Handlers open a
//! connection per request; `seq` keeps snapshots in insertion order.

use common::store::StoredDocument;
use rusqlite::{params, Connection};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("invalid document body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("document {0} not found")]
    NotFound(String),
}

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS documents (
    seq       INTEGER PRIMARY KEY AUTOINCREMENT,
    partition TEXT NOT NULL,
    id        TEXT NOT NULL,
    body      TEXT NOT NULL,
    UNIQUE (partition, id)
);
CREATE INDEX IF NOT EXISTS documents_by_partition ON documents (partition, seq);
";

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> Result<Connection, DbError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    pub fn init_schema(&self) -> Result<(), DbError> {
        self.open()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Current contents of a partition, oldest first.
    pub fn snapshot(&self, partition: &str) -> Result<Vec<StoredDocument>, DbError> {
        let conn = self.open()?;
        let mut stmt =
            conn.prepare("SELECT id, body FROM documents WHERE partition = ?1 ORDER BY seq")?;
        let rows = stmt.query_map(params![partition], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut documents = Vec::new();
        for row in rows {
            let (id, body) = row?;
            let fields: Map<String, Value> = serde_json::from_str(&body)?;
            documents.push(StoredDocument { id, fields });
        }
        Ok(documents)
    }

    pub fn insert(&self, partition: &str, fields: &Map<String, Value>) -> Result<String, DbError> {
        let id = Uuid::new_v4().simple().to_string();
        self.open()?.execute(
            "INSERT INTO documents (partition, id, body) VALUES (?1, ?2, ?3)",
            params![partition, &id, serde_json::to_string(fields)?],
        )?;
        Ok(id)
    }

    /// Replaces the whole body of an existing document.
    pub fn update(
        &self,
        partition: &str,
        id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), DbError> {
        let changed = self.open()?.execute(
            "UPDATE documents SET body = ?1 WHERE partition = ?2 AND id = ?3",
            params![serde_json::to_string(fields)?, partition, id],
        )?;
        if changed == 0 {
            return Err(DbError::NotFound(id.to_string()));
        }
        Ok(())
    }

    /// Deletes by id; returns whether a document was removed.
    pub fn delete(&self, partition: &str, id: &str) -> Result<bool, DbError> {
        let removed = self.open()?.execute(
            "DELETE FROM documents WHERE partition = ?1 AND id = ?2",
            params![partition, id],
        )?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    fn database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("docs.sqlite"));
        db.init_schema().unwrap();
        (dir, db)
    }

    #[test]
    fn snapshot_keeps_insertion_order_per_partition() {
        let (_dir, db) = database();
        let a = db.insert("p1", &fields(json!({ "sku": "A" }))).unwrap();
        db.insert("p2", &fields(json!({ "sku": "X" }))).unwrap();
        let b = db.insert("p1", &fields(json!({ "sku": "B" }))).unwrap();

        let ids: Vec<String> = db.snapshot("p1").unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(db.snapshot("p2").unwrap().len(), 1);
    }

    #[test]
    fn update_overwrites_the_full_body() {
        let (_dir, db) = database();
        let id = db
            .insert("p", &fields(json!({ "nombre": "Laptop", "sede": "Sede Lima" })))
            .unwrap();
        db.update("p", &id, &fields(json!({ "nombre": "Laptop Dell" })))
            .unwrap();

        let doc = db.snapshot("p").unwrap().remove(0);
        assert_eq!(doc.fields, fields(json!({ "nombre": "Laptop Dell" })));
    }

    #[test]
    fn update_of_missing_document_is_not_found() {
        let (_dir, db) = database();
        assert!(matches!(
            db.update("p", "nope", &Map::new()),
            Err(DbError::NotFound(id)) if id == "nope"
        ));
    }

    #[test]
    fn delete_reports_whether_anything_was_removed() {
        let (_dir, db) = database();
        let id = db.insert("p", &Map::new()).unwrap();
        assert!(!db.delete("other", &id).unwrap());
        assert!(db.delete("p", &id).unwrap());
        assert!(!db.delete("p", &id).unwrap());
    }
}
