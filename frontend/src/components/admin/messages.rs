use common::controller::{DeleteOutcome, EditTarget, EditorMode, SeedReport, View};
use common::error::StoreError;
use common::model::{CollectionKind, Equipment, Record, User};
use common::store::StoreIdentity;
use common::sync::SnapshotEvent;
use futures::channel::oneshot;

use super::helpers::Field;

/// Outcome of a save, tagged with the collection it was for.
pub enum SaveResult {
    Equipment(Result<Record<Equipment>, StoreError>),
    User(Result<Record<User>, StoreError>),
}

pub enum Msg {
    StoreSignedIn(Result<StoreIdentity, StoreError>),
    UpdateUsername(String),
    UpdatePassword(String),
    SubmitLogin,
    Logout,
    Initialized(Result<SeedReport, StoreError>),
    Snapshot(SnapshotEvent),
    Navigate(View),
    OpenEditor(EditorMode, EditTarget),
    EditField(Field, String),
    CloseEditor,
    Save,
    SaveFinished(SaveResult),
    Delete(CollectionKind, String),
    DeleteFinished(Result<DeleteOutcome, StoreError>),
    AskConfirmation(String, oneshot::Sender<bool>),
    AnswerConfirmation(bool),
}
