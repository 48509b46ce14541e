//! Expiration Policy Module
//!
//! Defines the time-based policies a cache instance can be configured with.
//! The policy is fixed at construction and never changes at runtime.

use std::time::Duration;

// == Expiration Policy ==
/// Time-based expiration behavior of a cache instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationPolicy {
    /// Entry expires after going unread for the given duration.
    /// The next access after expiry triggers a synchronous reload.
    ExpireAfterAccess(Duration),
    /// Entry is served (possibly stale) forever, but once it is older than
    /// the given duration a read triggers a non-blocking background reload.
    RefreshAfterWrite(Duration),
    /// Entries never expire; only LRU eviction removes them.
    None,
}

impl ExpirationPolicy {
    /// Returns the configured duration, if the policy has one.
    pub fn duration(&self) -> Option<Duration> {
        match self {
            ExpirationPolicy::ExpireAfterAccess(d) => Some(*d),
            ExpirationPolicy::RefreshAfterWrite(d) => Some(*d),
            ExpirationPolicy::None => None,
        }
    }
}
