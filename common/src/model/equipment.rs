use serde::{Deserialize, Serialize};

use super::record::{CollectionKind, Document, DocumentMessages};
use crate::seed;

/// An inventory item.
///
/// Field names on the wire are the store's (`nombre`, `tipo`, `sede`, `sku`).
/// `sku` is a display field: the seed set itself repeats one, so it is never
/// used as a key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Equipment {
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "tipo")]
    pub category: String,
    #[serde(rename = "sede")]
    pub site: String,
    pub sku: String,
}

impl Equipment {
    pub fn new(name: &str, category: &str, site: &str, sku: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
            site: site.to_string(),
            sku: sku.to_string(),
        }
    }
}

impl Document for Equipment {
    const KIND: CollectionKind = CollectionKind::Equipment;
    const MESSAGES: DocumentMessages = DocumentMessages {
        added: "Equipo añadido exitosamente.",
        updated: "Equipo actualizado exitosamente.",
        deleted: "Equipo eliminado exitosamente.",
        save_failed: "Error al guardar equipo.",
        delete_failed: "Error al eliminar equipo.",
        confirm_delete: "¿Estás seguro de que quieres eliminar este equipo?",
    };

    fn seed() -> Vec<Self> {
        seed::equipment()
    }
}
