//! Loading Cache Module
//!
//! The read-through cache engine. Combines HashMap storage with LRU
//! tracking, time-based expiration policies and load coalescing: concurrent
//! requests for the same missing key share a single loader invocation.
//!
//! The entry map is guarded by a mutex that is never held across a loader
//! call. Waiters are parked on a per-key `watch` channel; the first caller to
//! discover a miss becomes the loader and publishes the outcome to everyone
//! coalesced onto the same flight.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use futures::future::BoxFuture;
use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use crate::cache::{CacheEntry, CacheStats, ExpirationPolicy, LruTracker};
use crate::error::{CacheError, Result};

// == Type Aliases ==
/// The caller-supplied load function.
type LoadFn<K, V> = Arc<dyn Fn(K) -> BoxFuture<'static, Result<V>> + Send + Sync>;

/// Outcome slot of an in-flight load: `None` until the loader publishes.
type Outcome<V> = Option<Result<V>>;

// == Loading Cache ==
/// A bounded, expiring, read-through cache.
///
/// Cloning the handle is cheap and shares the underlying state, so the same
/// instance can be handed to many tasks.
pub struct LoadingCache<K, V> {
    inner: Arc<Inner<K, V>>,
}

impl<K, V> Clone for LoadingCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> std::fmt::Debug for LoadingCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingCache")
            .field("max_entries", &self.inner.max_entries)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

struct Inner<K, V> {
    /// Entry map, LRU order, in-flight loads and counters, under one lock
    state: Mutex<State<K, V>>,
    /// Maximum number of entries before LRU eviction kicks in
    max_entries: usize,
    /// Expiration behavior, fixed at construction
    policy: ExpirationPolicy,
    /// Computes a value for a missing key
    loader: LoadFn<K, V>,
}

struct State<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    lru: LruTracker<K>,
    /// One receiver per key with a load in flight
    flights: HashMap<K, watch::Receiver<Outcome<V>>>,
    stats: CacheStats,
}

/// Role of a caller with respect to an in-flight load.
enum Flight<V> {
    /// This caller runs the loader and publishes the outcome
    Leader(watch::Sender<Outcome<V>>),
    /// Another caller is already loading; await its outcome
    Follower(watch::Receiver<Outcome<V>>),
}

/// What a `get` decided to do while holding the state lock.
enum Plan<V> {
    /// Fresh (or stale-but-servable) value; `reload` is set when this read
    /// must trigger a background refresh
    Hit {
        value: V,
        reload: Option<watch::Sender<Outcome<V>>>,
    },
    /// A load for this key is already in flight
    Wait(watch::Receiver<Outcome<V>>),
    /// This caller becomes the loader
    Load(watch::Sender<Outcome<V>>),
}

impl<K, V> State<K, V>
where
    K: Eq + Hash + Clone + Display,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            flights: HashMap::new(),
            stats: CacheStats::new(),
        }
    }

    // == Store ==
    /// Inserts or replaces a loaded entry, evicting the least recently used
    /// entry first when a new key would exceed the capacity.
    ///
    /// A zero-capacity cache stores nothing; the loaded value still reaches
    /// the callers, every get just goes back to the loader.
    fn store(&mut self, key: K, value: V, max_entries: usize) {
        if max_entries == 0 {
            return;
        }

        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= max_entries {
            if let Some(evicted) = self.lru.evict_oldest() {
                self.entries.remove(&evicted);
                self.stats.record_eviction();
                debug!(key = %evicted, "evicted least recently used entry");
            }
        }

        self.entries.insert(key.clone(), CacheEntry::new(value));
        self.lru.touch(&key);

        let count = self.entries.len();
        self.stats.set_total_entries(count);
    }

    // == Drop Entry ==
    /// Removes an entry and its LRU bookkeeping.
    fn drop_entry(&mut self, key: &K) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.lru.remove(key);
            let count = self.entries.len();
            self.stats.set_total_entries(count);
        }
        removed
    }

    // == Join Flight ==
    /// Joins the in-flight load for `key`, or starts one.
    ///
    /// A leader that was cancelled before publishing leaves a closed channel
    /// behind; such a flight is taken over rather than waited on.
    fn join_flight(&mut self, key: &K) -> Flight<V> {
        if let Some(rx) = self.flights.get(key) {
            let dead = rx.has_changed().is_err() && rx.borrow().is_none();
            if !dead {
                return Flight::Follower(rx.clone());
            }
        }

        let (tx, rx) = watch::channel(None);
        self.flights.insert(key.clone(), rx);
        self.stats.record_load();
        Flight::Leader(tx)
    }
}

impl<K, V> LoadingCache<K, V>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructor ==
    /// Creates a new LoadingCache bound to a load function.
    ///
    /// # Arguments
    /// * `max_entries` - Maximum number of entries before LRU eviction; a
    ///   capacity of zero disables storage entirely (every get loads)
    /// * `policy` - Expiration policy, fixed for the cache's lifetime
    /// * `loader` - Computes a value for a key; called on misses and refreshes
    pub fn new<F, Fut>(max_entries: usize, policy: ExpirationPolicy, loader: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V>> + Send + 'static,
    {
        let loader: LoadFn<K, V> = Arc::new(move |key| Box::pin(loader(key)));
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State::new()),
                max_entries,
                policy,
                loader,
            }),
        }
    }

    // == Get ==
    /// Retrieves the value for `key`, loading it if necessary.
    ///
    /// A fresh hit returns a clone of the stored value without any I/O. On a
    /// miss (or an access-expired entry) the first caller invokes the loader
    /// while concurrent callers for the same key await the shared outcome.
    /// Under `RefreshAfterWrite`, a stale entry is returned immediately and
    /// at most one background reload is scheduled; the caller never blocks
    /// on it.
    ///
    /// A failed load stores nothing: the error is returned to this caller
    /// and every coalesced waiter, and the next `get` retries.
    pub async fn get(&self, key: &K) -> Result<V> {
        let plan = {
            let mut state = self.inner.state.lock().await;

            // An access-expired entry is dropped up front so the code below
            // sees a plain miss.
            if let Some(entry) = state.entries.get(key) {
                if entry.is_expired(self.inner.policy) {
                    debug!(key = %key, "entry expired after access timeout");
                    state.drop_entry(key);
                }
            }

            match state.entries.get_mut(key) {
                Some(entry) => {
                    entry.touch();
                    let value = entry.value.clone();
                    let stale = entry.needs_refresh(self.inner.policy);
                    state.lru.touch(key);
                    state.stats.record_hit();

                    let reload = if stale {
                        state.stats.record_stale_serve();
                        match state.join_flight(key) {
                            Flight::Leader(tx) => Some(tx),
                            // a reload is already running for this key
                            Flight::Follower(_) => None,
                        }
                    } else {
                        None
                    };

                    Plan::Hit { value, reload }
                }
                None => {
                    state.stats.record_miss();
                    match state.join_flight(key) {
                        Flight::Leader(tx) => Plan::Load(tx),
                        Flight::Follower(rx) => Plan::Wait(rx),
                    }
                }
            }
        };

        match plan {
            Plan::Hit { value, reload } => {
                if let Some(tx) = reload {
                    self.spawn_reload(key.clone(), tx);
                }
                Ok(value)
            }
            Plan::Wait(rx) => self.await_outcome(key, rx).await,
            Plan::Load(tx) => self.load_and_publish(key, tx).await,
        }
    }

    // == Invalidate ==
    /// Removes the entry for `key` unconditionally.
    ///
    /// Idempotent: invalidating an absent key is a no-op. Does not cancel an
    /// in-flight load; a load already running will repopulate the entry when
    /// it completes.
    pub async fn invalidate(&self, key: &K) {
        let mut state = self.inner.state.lock().await;
        if state.drop_entry(key) {
            debug!(key = %key, "invalidated");
        }
    }

    // == Refresh ==
    /// Schedules one background reload for `key`, regardless of freshness.
    ///
    /// Follows the same coalescing rule as a miss: if a load is already in
    /// flight for the key, no second one is started. Returns immediately;
    /// the only externally visible effect is the eventual entry replacement.
    pub async fn refresh(&self, key: &K) {
        let flight = {
            let mut state = self.inner.state.lock().await;
            state.join_flight(key)
        };
        if let Flight::Leader(tx) = flight {
            self.spawn_reload(key.clone(), tx);
        }
    }

    // == Evict Expired ==
    /// Removes all entries currently expired under the configured policy.
    ///
    /// Returns the number of entries removed. Purely memory hygiene: expiry
    /// is re-checked on every access anyway. Under `RefreshAfterWrite` or no
    /// policy this removes nothing.
    pub async fn evict_expired(&self) -> usize {
        let policy = self.inner.policy;
        let mut state = self.inner.state.lock().await;

        let expired: Vec<K> = state
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(policy))
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired.len();
        for key in expired {
            state.drop_entry(&key);
        }
        count
    }

    // == Stats ==
    /// Returns a snapshot of the cache counters.
    pub async fn stats(&self) -> CacheStats {
        let state = self.inner.state.lock().await;
        let mut stats = state.stats.clone();
        stats.set_total_entries(state.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        self.inner.state.lock().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    // == Load And Publish ==
    /// Synchronous miss path: runs the loader without holding the state
    /// lock, then stores the value (on success) and publishes the outcome to
    /// all waiters.
    async fn load_and_publish(&self, key: &K, tx: watch::Sender<Outcome<V>>) -> Result<V> {
        let result = (self.inner.loader)(key.clone()).await;

        let mut state = self.inner.state.lock().await;
        state.flights.remove(key);
        match &result {
            Ok(value) => state.store(key.clone(), value.clone(), self.inner.max_entries),
            Err(err) => {
                state.stats.record_load_failure();
                debug!(key = %key, error = %err, "load failed, nothing stored");
            }
        }
        // Waiters may all have gone away; that is fine.
        let _ = tx.send(Some(result.clone()));

        result
    }

    // == Await Outcome ==
    /// Waits for the in-flight load on `key` to publish its outcome.
    async fn await_outcome(&self, key: &K, mut rx: watch::Receiver<Outcome<V>>) -> Result<V> {
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome;
            }
            if rx.changed().await.is_err() {
                // The leader was dropped before publishing. Clear the dead
                // flight so the next get starts over.
                let mut state = self.inner.state.lock().await;
                if let Some(existing) = state.flights.get(key) {
                    if existing.has_changed().is_err() {
                        state.flights.remove(key);
                    }
                }
                return Err(CacheError::LoadAborted(key.to_string()));
            }
        }
    }

    // == Spawn Reload ==
    /// Runs the loader on a background task and replaces the entry on
    /// success. A failure keeps the previous entry untouched; it is recorded
    /// in the stats and logged, never surfaced to any caller.
    fn spawn_reload(&self, key: K, tx: watch::Sender<Outcome<V>>) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            let result = (inner.loader)(key.clone()).await;

            let mut state = inner.state.lock().await;
            state.flights.remove(&key);
            match &result {
                Ok(value) => {
                    state.store(key.clone(), value.clone(), inner.max_entries);
                    debug!(key = %key, "background reload completed");
                }
                Err(err) => {
                    state.stats.record_refresh_failure();
                    warn!(key = %key, error = %err, "background reload failed, keeping previous value");
                }
            }
            let _ = tx.send(Some(result));
        });
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn counting_cache(
        max_entries: usize,
        policy: ExpirationPolicy,
    ) -> (LoadingCache<String, String>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let cache = LoadingCache::new(max_entries, policy, move |key: String| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(format!("value-of-{key}"))
            }
        });
        (cache, calls)
    }

    #[tokio::test]
    async fn test_get_loads_on_miss() {
        let (cache, calls) = counting_cache(10, ExpirationPolicy::None);

        let value = cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(value, "value-of-a");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_hit_does_not_reload() {
        let (cache, calls) = counting_cache(10, ExpirationPolicy::None);

        cache.get(&"a".to_string()).await.unwrap();
        cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_load_failure_stores_nothing() {
        let cache: LoadingCache<String, String> =
            LoadingCache::new(10, ExpirationPolicy::None, |key: String| async move {
                Err(CacheError::NotFound(key))
            });

        let result = cache.get(&"missing".to_string()).await;
        assert_eq!(result, Err(CacheError::NotFound("missing".to_string())));
        assert!(cache.is_empty().await);

        let stats = cache.stats().await;
        assert_eq!(stats.load_failures, 1);
    }

    #[tokio::test]
    async fn test_invalidate_then_get_reloads() {
        let (cache, calls) = counting_cache(10, ExpirationPolicy::None);

        cache.get(&"a".to_string()).await.unwrap();
        cache.invalidate(&"a".to_string()).await;
        assert!(cache.is_empty().await);

        cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_absent_key_is_noop() {
        let (cache, _) = counting_cache(10, ExpirationPolicy::None);
        cache.invalidate(&"never-seen".to_string()).await;
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_zero_capacity_stores_nothing() {
        let (cache, calls) = counting_cache(0, ExpirationPolicy::None);

        let value = cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(value, "value-of-a");
        assert!(cache.is_empty().await, "capacity bound holds at zero");

        // Without storage every get goes back to the loader
        cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lru_eviction_keeps_bound() {
        let (cache, _) = counting_cache(3, ExpirationPolicy::None);

        for key in ["a", "b", "c"] {
            cache.get(&key.to_string()).await.unwrap();
        }
        // Touch "a" so "b" becomes the eviction victim
        cache.get(&"a".to_string()).await.unwrap();
        cache.get(&"d".to_string()).await.unwrap();

        assert_eq!(cache.len().await, 3);
        let stats = cache.stats().await;
        assert_eq!(stats.evictions, 1);

        // "b" was evicted: getting it again goes back to the loader
        let misses_before = cache.stats().await.misses;
        cache.get(&"b".to_string()).await.unwrap();
        assert_eq!(cache.stats().await.misses, misses_before + 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_after_access_boundary() {
        let ttl = Duration::from_secs(60);
        let (cache, calls) = counting_cache(10, ExpirationPolicy::ExpireAfterAccess(ttl));

        cache.get(&"a".to_string()).await.unwrap();

        tokio::time::advance(ttl - Duration::from_secs(1)).await;
        cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1, "not yet expired");

        tokio::time::advance(ttl + Duration::from_secs(1)).await;
        cache.get(&"a".to_string()).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2, "expired after idle period");
    }

    #[tokio::test(start_paused = true)]
    async fn test_evict_expired_sweep() {
        let ttl = Duration::from_secs(60);
        let (cache, _) = counting_cache(10, ExpirationPolicy::ExpireAfterAccess(ttl));

        cache.get(&"a".to_string()).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.get(&"b".to_string()).await.unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;

        // "a" idle 75s, "b" idle 45s
        let removed = cache.evict_expired().await;
        assert_eq!(removed, 1);
        assert_eq!(cache.len().await, 1);
    }
}
