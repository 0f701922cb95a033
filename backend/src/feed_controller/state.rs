//! Change propagation for the live snapshot feeds.
//!
//! Write handlers commit to SQLite and then announce the touched partition
//! on an MPSC channel. A single dispatcher task drains that channel, bumps
//! the partition's version and rebroadcasts a `ChangeEvent` to every open
//! feed. Feeds re-read the partition on each event, so a subscriber always
//! ends on the latest committed snapshot.

use log::{debug, warn};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{broadcast, mpsc, RwLock};

/// Shared by every handler as `web::Data`.
#[derive(Clone)]
pub struct FeedState {
    /// Last version handed out per partition path.
    pub versions: Arc<RwLock<HashMap<String, u64>>>,
    /// Commit announcements, consumed by `start_change_dispatcher`.
    pub tx: mpsc::Sender<ChangeNotice>,
    events: broadcast::Sender<ChangeEvent>,
}

/// A write handler committed a change to `partition`.
#[derive(Debug)]
pub struct ChangeNotice {
    pub(crate) partition: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub partition: String,
    pub version: u64,
}

impl FeedState {
    /// Creates the state and the receiving end the dispatcher consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ChangeNotice>) {
        let (tx, rx) = mpsc::channel(capacity);
        let (events, _) = broadcast::channel(capacity);
        let state = Self {
            versions: Arc::new(RwLock::new(HashMap::new())),
            tx,
            events,
        };
        (state, rx)
    }

    pub async fn announce(&self, partition: &str) {
        let notice = ChangeNotice {
            partition: partition.to_string(),
        };
        if self.tx.send(notice).await.is_err() {
            warn!("change dispatcher is gone; {} will not be pushed", partition);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.events.subscribe()
    }

    pub async fn version(&self, partition: &str) -> u64 {
        self.versions
            .read()
            .await
            .get(partition)
            .copied()
            .unwrap_or(0)
    }
}

/// Long-running task spawned from `main.rs`. Versions are assigned in the
/// order notices arrive.
pub async fn start_change_dispatcher(state: FeedState, mut rx: mpsc::Receiver<ChangeNotice>) {
    while let Some(notice) = rx.recv().await {
        let version = {
            let mut versions = state.versions.write().await;
            let version = versions.entry(notice.partition.clone()).or_insert(0);
            *version += 1;
            *version
        };
        debug!("{} is now at version {}", notice.partition, version);
        // No open feed is not an error.
        let _ = state.events.send(ChangeEvent {
            partition: notice.partition,
            version,
        });
    }
}
