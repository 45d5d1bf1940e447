//! In-memory token cache keyed by `baseUrl:username`
//!
//! One instance is shared by every operation in the process. Entries are
//! replaced wholesale on `set` and never mutated in place; expired entries
//! stay until they are overwritten, deleted or purged.

use std::sync::Arc;

use dashmap::DashMap;
use glue_common::{Clock, SystemClock};
use glue_domain::CachedToken;
use serde::{Deserialize, Serialize};

/// Snapshot of the cache contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of entries
    pub total: usize,
    /// Entries that have not expired yet
    pub valid: usize,
    /// Entries past their `expires_at`
    pub expired: usize,
}

/// Thread-safe token cache
pub struct TokenCache {
    entries: DashMap<String, CachedToken>,
    clock: Arc<dyn Clock>,
}

impl TokenCache {
    /// Create a cache backed by the system clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create a cache with a custom clock (tests use `MockClock`)
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { entries: DashMap::new(), clock }
    }

    /// Current time in milliseconds, as seen by this cache
    pub fn now_ms(&self) -> u64 {
        self.clock.millis_since_epoch()
    }

    pub fn get(&self, key: &str) -> Option<CachedToken> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    /// Insert or replace the entry for `key`
    pub fn set(&self, key: impl Into<String>, token: CachedToken) {
        self.entries.insert(key.into(), token);
    }

    /// Remove the entry for `key`, returning whether one existed
    pub fn delete(&self, key: &str) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.now_ms();
        let (valid, expired) = self.entries.iter().fold((0, 0), |(valid, expired), entry| {
            if entry.value().is_valid_at(now) {
                (valid + 1, expired)
            } else {
                (valid, expired + 1)
            }
        });

        CacheStats { total: valid + expired, valid, expired }
    }

    /// Remove every entry whose `expires_at` has passed
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.now_ms();
        let mut removed = 0;
        self.entries.retain(|_, token| {
            let keep = token.is_valid_at(now);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

impl Default for TokenCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache").field("entries", &self.entries.len()).finish_non_exhaustive()
    }
}
