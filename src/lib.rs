//! Loadcache - A read-through loading cache
//!
//! Provides a bounded, expiring, auto-refreshing view over an expensive data
//! source: LRU eviction, expire-after-access and refresh-after-write
//! policies, and coalescing of concurrent loads for the same key. A typed
//! facade wires three named instances to a user/check-in domain.

pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod source;
pub mod tasks;
pub mod user_cache;

pub use cache::{CacheStats, ExpirationPolicy, LoadingCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use source::UserSource;
pub use tasks::spawn_cleanup_task;
pub use user_cache::UserCache;
