//! Configuration Module
//!
//! Sizes and durations for the named cache instances, loaded from
//! environment variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Configuration for the named cache instances.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the user-by-id cache
    pub user_cache_size: usize,
    /// Idle time after which a cached user expires
    pub user_ttl: Duration,
    /// Age after which a score-ranking read triggers a background refresh
    pub score_rank_refresh: Duration,
    /// Idle time after which a cached daily ranking expires
    pub check_in_rank_ttl: Duration,
    /// Number of entries in the ranked lists
    pub rank_limit: usize,
    /// Interval for the optional expired-entry cleanup task, in seconds
    pub cleanup_interval: u64,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `USER_CACHE_SIZE` - Maximum cached users (default: 1000)
    /// - `USER_CACHE_TTL_SECS` - User idle expiry in seconds (default: 1800)
    /// - `SCORE_RANK_REFRESH_SECS` - Score ranking refresh age in seconds (default: 600)
    /// - `CHECK_IN_RANK_TTL_SECS` - Daily ranking idle expiry in seconds (default: 3600)
    /// - `RANK_LIMIT` - Ranked list length (default: 10)
    /// - `CLEANUP_INTERVAL_SECS` - Cleanup frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            user_cache_size: env_or("USER_CACHE_SIZE", 1000),
            user_ttl: Duration::from_secs(env_or("USER_CACHE_TTL_SECS", 30 * 60)),
            score_rank_refresh: Duration::from_secs(env_or("SCORE_RANK_REFRESH_SECS", 10 * 60)),
            check_in_rank_ttl: Duration::from_secs(env_or("CHECK_IN_RANK_TTL_SECS", 60 * 60)),
            rank_limit: env_or("RANK_LIMIT", 10),
            cleanup_interval: env_or("CLEANUP_INTERVAL_SECS", 60),
        }
    }
}

fn env_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            user_cache_size: 1000,
            user_ttl: Duration::from_secs(30 * 60),
            score_rank_refresh: Duration::from_secs(10 * 60),
            check_in_rank_ttl: Duration::from_secs(60 * 60),
            rank_limit: 10,
            cleanup_interval: 60,
        }
    }
}
