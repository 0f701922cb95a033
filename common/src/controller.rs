//! Admin session and record store controller.
//!
//! `AdminController` owns the session, the mirrored collections and the
//! plain UI state (current view, open editor). It is driven from a single
//! thread: the UI calls `login`/`logout`/`navigate` directly and feeds
//! snapshot events back through `apply_snapshot`.
//!
//! Store writes go through `RecordClient`, a cheap clone handed out only
//! while the session is authenticated. Writes never touch the local
//! collections; the store's next snapshot is the source of truth. A client
//! obtained before logout keeps working, so late writes still land in the
//! store without any visible effect.

use std::rc::Rc;

use log::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::confirm::Confirmation;
use crate::error::{AuthError, StoreError};
use crate::model::{CollectionKind, Document, Equipment, Record, User};
use crate::notify::Notifier;
use crate::seed::seed_if_empty;
use crate::session::{Session, check_credentials};
use crate::store::{Partition, RecordStore, SnapshotResult, StoreIdentity, Subscription};
use crate::sync::{RecordCollection, SnapshotEvent};

/// Where snapshot events are delivered. In the dashboard this posts a
/// component message; tests queue them.
pub type EventSink = Rc<dyn Fn(SnapshotEvent)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Users,
    Equipment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    /// Read-only detail view.
    View,
    Edit,
    Add,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditTarget {
    Equipment(Record<Equipment>),
    User(Record<User>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Editor {
    pub mode: EditorMode,
    pub target: EditTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user answered "no"; nothing was sent to the store.
    Cancelled,
}

/// Records inserted per collection by `RecordClient::initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub equipment: usize,
    pub users: usize,
}

pub struct AdminController<S, N> {
    store: S,
    notifier: N,
    config: AppConfig,
    session: Session,
    /// Bumped on every login; events from older sessions are dropped.
    generation: u64,
    store_identity: Option<StoreIdentity>,
    view: View,
    editor: Option<Editor>,
    equipment: RecordCollection<Equipment>,
    users: RecordCollection<User>,
}

impl<S, N> AdminController<S, N>
where
    S: RecordStore,
    N: Notifier + Clone + 'static,
{
    pub fn new(store: S, notifier: N, config: AppConfig) -> Self {
        Self {
            store,
            notifier,
            config,
            session: Session::default(),
            generation: 0,
            store_identity: None,
            view: View::Login,
            editor: None,
            equipment: RecordCollection::new(),
            users: RecordCollection::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_identity(&self) -> Option<&StoreIdentity> {
        self.store_identity.as_ref()
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.editor.as_ref()
    }

    /// The open editor's draft, for form input. Edits stay local until saved.
    pub fn editor_mut(&mut self) -> Option<&mut Editor> {
        self.editor.as_mut()
    }

    pub fn equipment(&self) -> &RecordCollection<Equipment> {
        &self.equipment
    }

    pub fn users(&self) -> &RecordCollection<User> {
        &self.users
    }

    /// Records the identity obtained by the silent store sign-in. This only
    /// grants store access; the session stays as it is.
    pub fn attach_store_identity(&mut self, identity: StoreIdentity) {
        info!(
            "Store access granted ({})",
            if identity.anonymous { "anonymous" } else { "provisioned" }
        );
        self.store_identity = Some(identity);
    }

    /// Checks the credentials and, on success, opens the dashboard and the
    /// live feeds of every managed collection.
    pub fn login(
        &mut self,
        username: &str,
        password: &str,
        sink: EventSink,
    ) -> Result<&Session, AuthError> {
        match check_credentials(username, password) {
            Ok(session) => {
                self.session = session;
                self.generation += 1;
                self.view = View::Dashboard;
                self.editor = None;

                let equipment = self.open_feed::<Equipment>(&sink);
                self.equipment.attach(equipment);
                let users = self.open_feed::<User>(&sink);
                self.users.attach(users);

                info!("Administrator signed in");
                self.notifier.success("Inicio de sesión exitoso.");
                Ok(&self.session)
            }
            Err(e) => {
                warn!("Login rejected for user {:?}", username);
                self.notifier.error(&e.to_string());
                Err(e)
            }
        }
    }

    fn open_feed<D: Document>(&self, sink: &EventSink) -> Subscription {
        let partition = Partition::for_document::<D>(self.config.app_id.as_str());
        let generation = self.generation;
        let sink = sink.clone();
        debug!("Subscribing to {}", partition);
        self.store.subscribe(
            &partition,
            Rc::new(move |result: SnapshotResult| {
                sink(SnapshotEvent {
                    kind: D::KIND,
                    generation,
                    result,
                })
            }),
        )
    }

    /// Ends the session. Feeds are released and every collection emptied;
    /// writes already in flight are left to finish on their own.
    pub fn logout(&mut self) {
        self.session = Session::default();
        self.equipment.clear();
        self.users.clear();
        self.editor = None;
        self.view = View::Login;
        info!("Administrator signed out");
        self.notifier.info("Sesión cerrada.");
    }

    /// Replaces a collection with a delivered snapshot. Returns whether the
    /// visible state changed.
    pub fn apply_snapshot(&mut self, event: SnapshotEvent) -> bool {
        if !self.session.authenticated || event.generation != self.generation {
            debug!("Dropping {:?} snapshot from a closed session", event.kind);
            return false;
        }

        match event.result {
            Ok(docs) => {
                let len = match event.kind {
                    CollectionKind::Equipment => self.equipment.replace(docs),
                    CollectionKind::Users => self.users.replace(docs),
                };
                debug!("{:?} snapshot applied ({} records)", event.kind, len);
                true
            }
            Err(e) => {
                error!("Live feed for {:?} failed: {}", event.kind, e);
                self.notifier.error("Error al sincronizar datos.");
                false
            }
        }
    }

    /// Switches the main view. Only authenticated sessions may leave the
    /// login view; use `logout` to go back to it.
    pub fn navigate(&mut self, view: View) -> bool {
        if !self.session.authenticated || view == View::Login {
            return false;
        }
        self.view = view;
        true
    }

    pub fn open_editor(&mut self, mode: EditorMode, target: EditTarget) -> bool {
        if !self.session.authenticated {
            return false;
        }
        self.editor = Some(Editor { mode, target });
        true
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Closes the editor after a successful save; on failure it stays open
    /// so the user can retry.
    pub fn finish_save<D>(&mut self, result: &Result<Record<D>, StoreError>) {
        if result.is_ok() {
            self.editor = None;
        }
    }

    pub fn finish_delete(&mut self, result: &Result<DeleteOutcome, StoreError>) {
        if matches!(result, Ok(DeleteOutcome::Deleted)) {
            self.editor = None;
        }
    }

    /// A handle for store writes, available only to an authenticated session.
    pub fn client(&self) -> Option<RecordClient<S, N>> {
        self.session.authenticated.then(|| RecordClient {
            store: self.store.clone(),
            notifier: self.notifier.clone(),
            app_id: self.config.app_id.clone(),
        })
    }
}

/// Issues writes against the store and reports their outcome to the user.
#[derive(Clone)]
pub struct RecordClient<S, N> {
    store: S,
    notifier: N,
    app_id: String,
}

impl<S, N> RecordClient<S, N>
where
    S: RecordStore,
    N: Notifier,
{
    pub fn partition<D: Document>(&self) -> Partition {
        Partition::for_document::<D>(self.app_id.as_str())
    }

    /// Seeds every managed partition that is found empty.
    pub async fn initialize(&self) -> Result<SeedReport, StoreError> {
        match self.seed_all().await {
            Ok(report) => Ok(report),
            Err(e) => {
                error!("Loading initial data failed: {}", e);
                self.notifier.error("Error al cargar datos iniciales.");
                Err(e)
            }
        }
    }

    async fn seed_all(&self) -> Result<SeedReport, StoreError> {
        let equipment =
            seed_if_empty::<S, Equipment>(&self.store, &self.partition::<Equipment>()).await?;
        let users = seed_if_empty::<S, User>(&self.store, &self.partition::<User>()).await?;
        Ok(SeedReport { equipment, users })
    }

    /// Inserts a record without id, or overwrites the stored document with
    /// the same id. The returned record carries the store id.
    pub async fn save<D: Document>(&self, record: Record<D>) -> Result<Record<D>, StoreError> {
        let updating = record.is_persisted();
        match self.write(record).await {
            Ok(saved) => {
                info!(
                    "{:?} record {} {}",
                    D::KIND,
                    saved.id.as_deref().unwrap_or_default(),
                    if updating { "updated" } else { "inserted" }
                );
                self.notifier.success(if updating {
                    D::MESSAGES.updated
                } else {
                    D::MESSAGES.added
                });
                Ok(saved)
            }
            Err(e) => {
                error!("Saving {:?} record failed: {}", D::KIND, e);
                self.notifier.error(D::MESSAGES.save_failed);
                Err(e)
            }
        }
    }

    async fn write<D: Document>(&self, record: Record<D>) -> Result<Record<D>, StoreError> {
        let partition = self.partition::<D>();
        let body = record.body()?;
        match record.id {
            Some(id) => {
                self.store.update(&partition, &id, body).await?;
                Ok(Record::with_id(id, record.fields))
            }
            None => {
                let id = self.store.insert(&partition, body).await?;
                Ok(Record::with_id(id, record.fields))
            }
        }
    }

    /// Asks for confirmation, then deletes by id. Nothing reaches the store
    /// unless the user confirmed.
    pub async fn delete<D, C>(&self, id: &str, confirmation: &C) -> Result<DeleteOutcome, StoreError>
    where
        D: Document,
        C: Confirmation + ?Sized,
    {
        if !confirmation.confirm(D::MESSAGES.confirm_delete).await {
            debug!("Deletion of {:?} record {} cancelled", D::KIND, id);
            return Ok(DeleteOutcome::Cancelled);
        }

        match self.store.delete(&self.partition::<D>(), id).await {
            Ok(()) => {
                info!("{:?} record {} deleted", D::KIND, id);
                self.notifier.success(D::MESSAGES.deleted);
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) => {
                error!("Deleting {:?} record {} failed: {}", D::KIND, id, e);
                self.notifier.error(D::MESSAGES.delete_failed);
                Err(e)
            }
        }
    }
}
