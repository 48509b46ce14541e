//! Data Source Module
//!
//! The outbound collaborator contract. The facade binds its load functions
//! to an implementation of this trait; the crate itself ships no database
//! access.
//!
//! Implementations must be safe to call concurrently for distinct keys.
//! Loads may be slow and may fail; the cache never applies a timeout, so a
//! hanging call blocks only the callers waiting on that one key.

use futures::future::BoxFuture;

use crate::error::Result;
use crate::models::{CheckIn, User};

// == User Source ==
/// Read access to the user data the named caches are built on.
pub trait UserSource: Send + Sync + 'static {
    /// Fetches one user by id. Must return [`CacheError::NotFound`] when the
    /// id is absent from the source.
    ///
    /// [`CacheError::NotFound`]: crate::error::CacheError::NotFound
    fn user_by_id(&self, id: i64) -> BoxFuture<'_, Result<User>>;

    /// Fetches the top `limit` users ordered by descending score.
    ///
    /// An empty result is a successful load, not an error.
    fn top_users_by_score(&self, limit: usize) -> BoxFuture<'_, Result<Vec<User>>>;

    /// Fetches up to `limit` check-ins for the given day (`%Y-%m-%d`),
    /// ordered ascending by update time.
    ///
    /// An empty result is a successful load, not an error.
    fn check_ins_for_day(&self, day: &str, limit: usize) -> BoxFuture<'_, Result<Vec<CheckIn>>>;
}
