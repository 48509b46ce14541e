//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, evictions, loads and the
//! outcomes of background refreshes.
//!
//! Background refresh failures are invisible to `get` by design (the stale
//! value keeps being served), so `stale_serves` and `refresh_failures` are
//! the only way to observe them besides the log.

use serde::Serialize;

// == Cache Stats ==
/// Tracks cache performance metrics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of reads served from the cache
    pub hits: u64,
    /// Number of reads that had to go to the loader (absent or expired)
    pub misses: u64,
    /// Number of entries evicted due to LRU policy
    pub evictions: u64,
    /// Number of loader invocations (synchronous and background)
    pub loads: u64,
    /// Number of synchronous loads that returned an error
    pub load_failures: u64,
    /// Number of reads that returned a stale value while a refresh was due
    pub stale_serves: u64,
    /// Number of background refreshes that failed and were swallowed
    pub refresh_failures: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Increments the loader invocation counter.
    pub fn record_load(&mut self) {
        self.loads += 1;
    }

    /// Increments the synchronous load failure counter.
    pub fn record_load_failure(&mut self) {
        self.load_failures += 1;
    }

    /// Increments the stale serve counter.
    pub fn record_stale_serve(&mut self) {
        self.stale_serves += 1;
    }

    /// Increments the swallowed refresh failure counter.
    pub fn record_refresh_failure(&mut self) {
        self.refresh_failures += 1;
    }

    // == Update Entry Count ==
    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
