//! User Cache Facade
//!
//! Three independently configured [`LoadingCache`] instances over one data
//! source, behind typed accessors:
//!
//! - `users`: user by id, expire-after-access
//! - `score_rank`: top-N users by score under a single fixed key,
//!   refresh-after-write
//! - `check_in_rank`: top-N check-ins keyed by the current day,
//!   expire-after-access
//!
//! The ranked lists are cached as one entry each, so a whole list is
//! reloaded or invalidated as a unit. This layer downgrades every load
//! error to an absent or empty result; callers get "value or nothing".

use std::sync::Arc;

use chrono::Local;

use crate::cache::{ExpirationPolicy, LoadingCache};
use crate::config::CacheConfig;
use crate::models::{CheckIn, User};
use crate::source::UserSource;

/// The single well-known key of the score-ranking cache.
const SCORE_RANK_KEY: &str = "data";

// == User Cache ==
/// Typed facade over the three named cache instances.
///
/// Built once at startup and shared by reference (or cloned handles) for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct UserCache {
    users: LoadingCache<i64, User>,
    score_rank: LoadingCache<String, Vec<User>>,
    check_in_rank: LoadingCache<String, Vec<CheckIn>>,
}

impl UserCache {
    // == Constructor ==
    /// Creates the named cache instances, binding each loader to `source`.
    pub fn new(source: Arc<dyn UserSource>, config: &CacheConfig) -> Self {
        let users = {
            let source = Arc::clone(&source);
            LoadingCache::new(
                config.user_cache_size,
                ExpirationPolicy::ExpireAfterAccess(config.user_ttl),
                move |id: i64| {
                    let source = Arc::clone(&source);
                    async move { source.user_by_id(id).await }
                },
            )
        };

        let score_rank = {
            let source = Arc::clone(&source);
            let limit = config.rank_limit;
            LoadingCache::new(
                config.rank_limit,
                ExpirationPolicy::RefreshAfterWrite(config.score_rank_refresh),
                move |_key: String| {
                    let source = Arc::clone(&source);
                    async move { source.top_users_by_score(limit).await }
                },
            )
        };

        let check_in_rank = {
            let limit = config.rank_limit;
            LoadingCache::new(
                config.rank_limit,
                ExpirationPolicy::ExpireAfterAccess(config.check_in_rank_ttl),
                move |day: String| {
                    let source = Arc::clone(&source);
                    async move { source.check_ins_for_day(&day, limit).await }
                },
            )
        };

        Self {
            users,
            score_rank,
            check_in_rank,
        }
    }

    // == Get User ==
    /// Returns the user with the given id, or `None`.
    ///
    /// Non-positive ids are rejected without consulting the cache. Load
    /// failures (absent in source, source unreachable) also come back as
    /// `None`; nothing is cached for them, so the next call retries.
    pub async fn get_user(&self, id: i64) -> Option<User> {
        if id <= 0 {
            return None;
        }
        self.users.get(&id).await.ok()
    }

    // == Invalidate User ==
    /// Drops the cached entry for the given user id, if any.
    pub async fn invalidate_user(&self, id: i64) {
        self.users.invalidate(&id).await;
    }

    // == Get Score Rank ==
    /// Returns the top users ordered by descending score.
    ///
    /// Served from the cache; past the refresh age the previous list is
    /// returned while a background reload runs. Empty on load failure.
    pub async fn get_score_rank(&self) -> Vec<User> {
        self.score_rank
            .get(&SCORE_RANK_KEY.to_string())
            .await
            .unwrap_or_default()
    }

    // == Get Check-In Rank ==
    /// Returns today's check-in ranking, earliest check-ins first.
    ///
    /// Empty on load failure. An empty day is a successful load and is
    /// cached as an empty list.
    pub async fn get_check_in_rank(&self) -> Vec<CheckIn> {
        self.check_in_rank
            .get(&today_day_name())
            .await
            .unwrap_or_default()
    }

    // == Refresh Check-In Rank ==
    /// Schedules a background reload of today's check-in ranking.
    ///
    /// Intended for the write path after a new check-in; never blocks on the
    /// reload.
    pub async fn refresh_check_in_rank(&self) {
        self.check_in_rank.refresh(&today_day_name()).await;
    }
}

/// Day identifier of the current local date, formatted `%Y-%m-%d`.
fn today_day_name() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
