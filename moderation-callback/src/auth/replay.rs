//! Nonce replay protection.
//!
//! Seen nonces are persisted in the configuration store as a JSON object
//! mapping nonce to first-seen unix time. Expired entries are pruned on
//! every accepted nonce, so the record never holds more than one window's
//! worth of distinct nonces.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

use crate::error::StoreError;
use crate::store::{ConfigStore, NONCES};
use crate::util::Clock;

/// Default validity window in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 900;

type NonceRecord = BTreeMap<String, i64>;

pub struct ReplayGuard {
    store: Arc<dyn ConfigStore>,
    clock: Arc<dyn Clock>,
    window: i64,
    // Serializes read-prune-write within this process.
    lock: Mutex<()>,
}

impl ReplayGuard {
    pub fn new(store: Arc<dyn ConfigStore>, clock: Arc<dyn Clock>, window: i64) -> Self {
        Self {
            store,
            clock,
            window,
            lock: Mutex::new(()),
        }
    }

    /// Returns `Ok(true)` if the nonce is new and now recorded, `Ok(false)`
    /// if it is a replay. A replay leaves the record untouched.
    pub fn check_and_record(&self, nonce: &str) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let mut record = self.load()?;
        if record.contains_key(nonce) {
            return Ok(false);
        }

        let now = self.clock.now();
        let cutoff = now.saturating_sub(self.window);
        let before = record.len();
        record.retain(|_, first_seen| *first_seen >= cutoff);

        debug!(
            pruned = before - record.len(),
            remaining = record.len(),
            "nonce_record_pruned"
        );

        record.insert(nonce.to_string(), now);
        self.store.set(NONCES, &serde_json::to_string(&record)?)?;

        Ok(true)
    }

    fn load(&self) -> Result<NonceRecord, StoreError> {
        match self.store.get(NONCES)? {
            Some(raw) if !raw.is_empty() => Ok(serde_json::from_str(&raw)?),
            _ => Ok(NonceRecord::new()),
        }
    }
}

impl std::fmt::Debug for ReplayGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplayGuard")
            .field("window", &self.window)
            .finish_non_exhaustive()
    }
}
