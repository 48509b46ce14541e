//! Cache Module
//!
//! Provides the generic read-through loading cache: bounded LRU storage,
//! time-based expiration policies and coalesced loads.

mod entry;
mod loading;
mod lru;
mod policy;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use entry::CacheEntry;
pub use loading::LoadingCache;
pub use lru::LruTracker;
pub use policy::ExpirationPolicy;
pub use stats::CacheStats;
