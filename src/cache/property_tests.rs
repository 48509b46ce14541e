//! Property-Based Tests for Cache Module
//!
//! Uses proptest to verify the engine's structural invariants over
//! arbitrary operation sequences.

use proptest::prelude::*;
use std::collections::VecDeque;

use crate::cache::{ExpirationPolicy, LoadingCache, LruTracker};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 8;

// == Strategies ==
/// Generates cache keys from a small pool so operations collide often.
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-d][0-9]".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Get { key: String },
    Invalidate { key: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        key_strategy().prop_map(|key| CacheOp::Get { key }),
        key_strategy().prop_map(|key| CacheOp::Invalidate { key }),
    ]
}

/// Runs an async cache scenario to completion on a fresh runtime.
fn block_on<F: std::future::Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("test runtime")
        .block_on(future)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // *For any* sequence of gets and invalidations, the entry count never
    // exceeds the configured capacity and the hit/miss counters add up to
    // the number of gets issued.
    #[test]
    fn prop_bounded_size_and_stats(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        block_on(async move {
            let cache = LoadingCache::new(
                TEST_MAX_ENTRIES,
                ExpirationPolicy::None,
                |key: String| async move { Ok(format!("value-of-{key}")) },
            );

            let mut gets: u64 = 0;
            for op in ops {
                match op {
                    CacheOp::Get { key } => {
                        gets += 1;
                        let value = cache.get(&key).await.unwrap();
                        prop_assert_eq!(value, format!("value-of-{key}"));
                        prop_assert!(cache.len().await <= TEST_MAX_ENTRIES);
                    }
                    CacheOp::Invalidate { key } => {
                        cache.invalidate(&key).await;
                    }
                }
            }

            let stats = cache.stats().await;
            prop_assert_eq!(stats.hits + stats.misses, gets);
            prop_assert_eq!(stats.total_entries, cache.len().await);
            // Every miss became exactly one loader call, none were coalesced
            // away in this single-task scenario
            prop_assert_eq!(stats.loads, stats.misses);
            Ok(())
        })?;
    }

    // *For any* access sequence, a get for a cached key always returns the
    // value the loader produced for that key (entries are never cross-wired
    // by eviction or invalidation).
    #[test]
    fn prop_get_returns_own_value(keys in prop::collection::vec(key_strategy(), 1..40)) {
        block_on(async move {
            let cache = LoadingCache::new(
                TEST_MAX_ENTRIES,
                ExpirationPolicy::None,
                |key: String| async move { Ok(format!("value-of-{key}")) },
            );

            for key in keys {
                let value = cache.get(&key).await.unwrap();
                prop_assert_eq!(value, format!("value-of-{key}"));
            }
            Ok(())
        })?;
    }

    // *For any* touch sequence, the tracker evicts in exactly the order a
    // naive recency model predicts.
    #[test]
    fn prop_lru_matches_model(keys in prop::collection::vec(key_strategy(), 1..50)) {
        let mut lru = LruTracker::new();
        // Front = most recent, like the tracker
        let mut model: VecDeque<String> = VecDeque::new();

        for key in &keys {
            lru.touch(key);
            model.retain(|k| k != key);
            model.push_front(key.clone());
        }

        prop_assert_eq!(lru.len(), model.len());
        while let Some(expected) = model.pop_back() {
            prop_assert_eq!(lru.evict_oldest(), Some(expected));
        }
        prop_assert!(lru.is_empty());
    }

    // *For any* interleaving of touches and removes, removed keys are gone
    // and the rest keep their relative order.
    #[test]
    fn prop_lru_remove_consistency(
        keys in prop::collection::vec(key_strategy(), 1..30),
        removals in prop::collection::vec(key_strategy(), 1..10),
    ) {
        let mut lru = LruTracker::new();
        let mut model: VecDeque<String> = VecDeque::new();

        for key in &keys {
            lru.touch(key);
            model.retain(|k| k != key);
            model.push_front(key.clone());
        }
        for key in &removals {
            lru.remove(key);
            model.retain(|k| k != key);
        }

        prop_assert_eq!(lru.len(), model.len());
        while let Some(expected) = model.pop_back() {
            prop_assert_eq!(lru.evict_oldest(), Some(expected));
        }
    }
}
