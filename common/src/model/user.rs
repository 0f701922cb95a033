use serde::{Deserialize, Serialize};

use super::record::{CollectionKind, Document, DocumentMessages};
use crate::seed;

/// A dashboard user entry. Purely a managed record; it grants no access.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct User {
    pub name: String,
    pub email: String,
    pub role: String,
}

impl User {
    pub fn new(name: &str, email: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }
}

impl Document for User {
    const KIND: CollectionKind = CollectionKind::Users;
    const MESSAGES: DocumentMessages = DocumentMessages {
        added: "Usuario añadido exitosamente.",
        updated: "Usuario actualizado exitosamente.",
        deleted: "Usuario eliminado exitosamente.",
        save_failed: "Error al guardar usuario.",
        delete_failed: "Error al eliminar usuario.",
        confirm_delete: "¿Estás seguro de que quieres eliminar este usuario?",
    };

    fn seed() -> Vec<Self> {
        seed::users()
    }
}
