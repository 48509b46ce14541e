//! User Model
//!
//! The forum user entity cached by id and ranked by score.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A forum user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// Primary key
    pub id: i64,
    /// Display name
    pub nickname: String,
    /// Avatar URL, empty if none set
    #[serde(default)]
    pub avatar: String,
    /// Accumulated score, the score-ranking sort key
    pub score: i64,
    /// Account creation time
    pub create_time: DateTime<Utc>,
}
