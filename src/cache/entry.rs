//! Cache Entry Module
//!
//! Per-entry bookkeeping: the loaded value plus the timestamps the
//! expiration policies are evaluated against.
//!
//! Timestamps use [`tokio::time::Instant`] so tests can drive expiry with a
//! paused clock instead of real sleeps.

use tokio::time::Instant;

use crate::cache::ExpirationPolicy;

// == Cache Entry ==
/// A single loaded value with its time metadata.
///
/// Entries are owned exclusively by the engine; callers only ever receive
/// clones of `value`. A reload replaces the whole entry, it never mutates
/// `value` in place.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The loaded value
    pub value: V,
    /// When the value was loaded into the cache
    loaded_at: Instant,
    /// When the entry was last read
    last_accessed: Instant,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a freshly loaded entry.
    pub fn new(value: V) -> Self {
        let now = Instant::now();
        Self {
            value,
            loaded_at: now,
            last_accessed: now,
        }
    }

    // == Touch ==
    /// Marks the entry as read now.
    pub fn touch(&mut self) {
        self.last_accessed = Instant::now();
    }

    /// Time elapsed since the value was loaded.
    pub fn age(&self) -> std::time::Duration {
        self.loaded_at.elapsed()
    }

    /// Time elapsed since the entry was last read.
    pub fn idle_time(&self) -> std::time::Duration {
        self.last_accessed.elapsed()
    }

    // == Is Expired ==
    /// Checks whether the entry is expired under the given policy.
    ///
    /// Only `ExpireAfterAccess` ever expires an entry: the boundary is
    /// inclusive, so an entry idle for exactly the configured duration is
    /// expired. `RefreshAfterWrite` entries stay servable forever (they go
    /// stale instead, see [`needs_refresh`](Self::needs_refresh)).
    pub fn is_expired(&self, policy: ExpirationPolicy) -> bool {
        match policy {
            ExpirationPolicy::ExpireAfterAccess(d) => self.idle_time() >= d,
            _ => false,
        }
    }

    // == Needs Refresh ==
    /// Checks whether a read should trigger a background reload.
    ///
    /// Only meaningful under `RefreshAfterWrite`: true once the value is at
    /// least the configured duration old.
    pub fn needs_refresh(&self, policy: ExpirationPolicy) -> bool {
        match policy {
            ExpirationPolicy::RefreshAfterWrite(d) => self.age() >= d,
            _ => false,
        }
    }
}
