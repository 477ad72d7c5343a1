//! # Record Store
//!
//! Key/value persistence with per-key lifetimes, in the shape of a cache
//! server: `get`, `set` with a TTL, `delete`, `expire`. The engine stores
//! JSON-encoded records under `shortcode:<code>`.
//!
//! [`MemoryStore`] is the in-process backend. It reads time from an
//! injected clock, so expiry is testable, and is not shared across
//! processes.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use vrp_core::{RedemptionError, SharedClock};

/// Pluggable backing store for short-code records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Value under `key`, `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>, RedemptionError>;

    /// Store `value` under `key`, replacing any previous value, for
    /// `ttl_secs` seconds.
    async fn set(&self, key: &str, value: String, ttl_secs: i64) -> Result<(), RedemptionError>;

    /// Remove `key`. Returns whether a live value was removed.
    async fn delete(&self, key: &str) -> Result<bool, RedemptionError>;

    /// Reset the lifetime of `key`. Returns whether the key exists.
    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<bool, RedemptionError>;
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: i64,
}

/// In-memory [`RecordStore`].
///
/// The lock is never held across an `.await`.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
    clock: SharedClock,
}

impl MemoryStore {
    pub fn new(clock: SharedClock) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now_secs();
        self.entries
            .read()
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_secs();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| e.expires_at > now);
        before - entries.len()
    }

    /// Overwrite the raw value under `key` without touching its lifetime.
    /// Returns whether the key existed.
    #[cfg(test)]
    pub(crate) fn tamper(&self, key: &str, f: impl FnOnce(&mut String)) -> bool {
        match self.entries.write().get_mut(key) {
            Some(entry) => {
                f(&mut entry.value);
                true
            }
            None => false,
        }
    }
}

impl std::fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("entries", &self.entries.read().len())
            .finish()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, RedemptionError> {
        let now = self.clock.now_secs();
        let mut entries = self.entries.write();
        match entries.get(key) {
            Some(entry) if entry.expires_at > now => Ok(Some(entry.value.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl_secs: i64) -> Result<(), RedemptionError> {
        let expires_at = self.clock.now_secs().saturating_add(ttl_secs);
        self.entries
            .write()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, RedemptionError> {
        let now = self.clock.now_secs();
        Ok(self
            .entries
            .write()
            .remove(key)
            .is_some_and(|e| e.expires_at > now))
    }

    async fn expire(&self, key: &str, ttl_secs: i64) -> Result<bool, RedemptionError> {
        let now = self.clock.now_secs();
        let mut entries = self.entries.write();
        match entries.get_mut(key) {
            Some(entry) if entry.expires_at > now => {
                entry.expires_at = now.saturating_add(ttl_secs);
                Ok(true)
            }
            Some(_) => {
                entries.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }
}
