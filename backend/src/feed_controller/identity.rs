//! Store-access identities handed out by `POST /api/identity/sign_in`.
//!
//! Anonymous identities live in memory only. Each one expires after `ttl`
//! without use, and the registry never holds more than `capacity` of them;
//! past that the least recently seen is evicted. A client whose uid was
//! forgotten (expiry, eviction, server restart) gets `401` and signs in again.

use common::store::StoreIdentity;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use uuid::Uuid;

pub const DEFAULT_CAPACITY: usize = 10_000;
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Clone)]
pub struct IdentityState {
    /// Anonymous uid to the last time it was used.
    issued: Arc<RwLock<HashMap<String, Instant>>>,
    provisioned: Arc<HashSet<String>>,
    capacity: usize,
    ttl: Duration,
}

impl Default for IdentityState {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl IdentityState {
    pub fn new(provisioned: impl IntoIterator<Item = String>) -> Self {
        Self::with_limits(provisioned, DEFAULT_CAPACITY, DEFAULT_TTL)
    }

    pub fn with_limits(
        provisioned: impl IntoIterator<Item = String>,
        capacity: usize,
        ttl: Duration,
    ) -> Self {
        Self {
            issued: Arc::default(),
            provisioned: Arc::new(provisioned.into_iter().collect()),
            capacity: capacity.max(1),
            ttl,
        }
    }

    /// A provisioned token signs in under its own name; anything else gets
    /// a fresh anonymous uid.
    pub async fn sign_in(&self, token: Option<&str>) -> StoreIdentity {
        if let Some(token) = token.filter(|t| self.provisioned.contains(*t)) {
            return StoreIdentity {
                uid: token.to_string(),
                anonymous: false,
            };
        }

        let uid = Uuid::new_v4().to_string();
        let now = Instant::now();
        let mut issued = self.issued.write().await;
        issued.retain(|_, seen| now.duration_since(*seen) < self.ttl);
        while issued.len() >= self.capacity {
            let oldest = issued
                .iter()
                .min_by_key(|(_, seen)| **seen)
                .map(|(uid, _)| uid.clone());
            match oldest {
                Some(oldest) => issued.remove(&oldest),
                None => break,
            };
        }
        issued.insert(uid.clone(), now);
        StoreIdentity {
            uid,
            anonymous: true,
        }
    }

    /// Whether `uid` may use the store. Using an anonymous uid refreshes it.
    pub async fn is_known(&self, uid: &str) -> bool {
        if self.provisioned.contains(uid) {
            return true;
        }
        let mut issued = self.issued.write().await;
        match issued.get_mut(uid) {
            Some(seen) if seen.elapsed() < self.ttl => {
                *seen = Instant::now();
                true
            }
            Some(_) => {
                issued.remove(uid);
                false
            }
            None => false,
        }
    }

    pub async fn issued_count(&self) -> usize {
        self.issued.read().await.len()
    }
}
