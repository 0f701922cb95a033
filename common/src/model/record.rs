//! Generic record envelope shared by every collection.
//!
//! A `Record<D>` pairs the document fields `D` with the optional id the store
//! assigns on first insert. On the wire the id sits next to the fields, so
//! `Record<Equipment>` serializes as `{"id": "...", "nombre": "...", ...}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::StoreError;
use crate::store::StoredDocument;

/// The collections managed by the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollectionKind {
    Equipment,
    Users,
}

impl CollectionKind {
    /// Last segment of the partition path.
    pub fn collection(self) -> &'static str {
        match self {
            CollectionKind::Equipment => "equipment",
            CollectionKind::Users => "users",
        }
    }
}

/// User-facing texts for one document type.
#[derive(Debug, Clone, Copy)]
pub struct DocumentMessages {
    pub added: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub save_failed: &'static str,
    pub delete_failed: &'static str,
    pub confirm_delete: &'static str,
}

/// A document type stored in its own partition.
pub trait Document:
    Serialize + DeserializeOwned + Clone + PartialEq + Default + std::fmt::Debug + 'static
{
    const KIND: CollectionKind;
    const MESSAGES: DocumentMessages;

    /// Records written into an empty partition at session start.
    fn seed() -> Vec<Self>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Record<D> {
    /// Absent until the store has persisted the record; stable afterwards.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(flatten)]
    pub fields: D,
}

impl<D: Document> Record<D> {
    /// An unsaved record. Saving it performs an insert.
    pub fn new(fields: D) -> Self {
        Self { id: None, fields }
    }

    pub fn with_id(id: impl Into<String>, fields: D) -> Self {
        Self {
            id: Some(id.into()),
            fields,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Decodes a raw store document into a typed record.
    pub fn from_stored(doc: StoredDocument) -> Result<Self, StoreError> {
        let fields = serde_json::from_value(Value::Object(doc.fields))?;
        Ok(Self {
            id: Some(doc.id),
            fields,
        })
    }

    /// The document body sent to the store. The id never travels in the body.
    pub fn body(&self) -> Result<Map<String, Value>, StoreError> {
        match serde_json::to_value(&self.fields)? {
            Value::Object(map) => Ok(map),
            other => Err(StoreError::network(format!(
                "document must serialize to an object, got {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Equipment;
    use serde_json::json;

    fn laptop() -> Equipment {
        Equipment {
            name: "Laptop Lenovo ThinkPad".to_string(),
            category: "Portátil".to_string(),
            site: "Sede Lima".to_string(),
            sku: "EQP001".to_string(),
        }
    }

    #[test]
    fn unsaved_record_omits_id_on_the_wire() {
        let value = serde_json::to_value(Record::new(laptop())).unwrap();
        assert_eq!(
            value,
            json!({
                "nombre": "Laptop Lenovo ThinkPad",
                "tipo": "Portátil",
                "sede": "Sede Lima",
                "sku": "EQP001"
            })
        );
    }

    #[test]
    fn stored_document_decodes_with_its_id() {
        let doc: StoredDocument = serde_json::from_value(json!({
            "id": "abc",
            "nombre": "Router TP-Link Archer",
            "tipo": "Red",
            "sede": "Sede Lima",
            "sku": "EQP010"
        }))
        .unwrap();

        let record = Record::<Equipment>::from_stored(doc).unwrap();
        assert_eq!(record.id.as_deref(), Some("abc"));
        assert_eq!(record.fields.category, "Red");
        assert!(record.is_persisted());
    }

    #[test]
    fn body_excludes_the_id() {
        let body = Record::with_id("abc", laptop()).body().unwrap();
        assert!(!body.contains_key("id"));
        assert_eq!(body.get("sku"), Some(&json!("EQP001")));
    }

    #[test]
    fn malformed_document_is_a_store_error() {
        let doc = StoredDocument {
            id: "x".to_string(),
            fields: serde_json::from_value(json!({ "nombre": 42 })).unwrap(),
        };
        assert!(matches!(
            Record::<Equipment>::from_stored(doc),
            Err(StoreError::Network(_))
        ));
    }
}
