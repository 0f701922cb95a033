pub mod equipment;
pub mod record;
pub mod user;

pub use equipment::Equipment;
pub use record::{CollectionKind, Document, DocumentMessages, Record};
pub use user::User;
