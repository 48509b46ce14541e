//! Check-In Model
//!
//! A user's daily check-in record; the daily ranking lists the earliest
//! check-ins of the current day.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A daily check-in record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    /// The user who checked in
    pub user_id: i64,
    /// Day of the latest check-in, formatted `%Y-%m-%d`
    pub latest_day_name: String,
    /// Current consecutive check-in streak
    pub consecutive_days: i32,
    /// When the record was last updated, the daily-ranking sort key
    pub update_time: DateTime<Utc>,
}
