//! Daily dispatch counters.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Sent / failed totals for one UTC day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DailyDispatchStats {
    /// The day.
    pub day: NaiveDate,
    /// Jobs marked sent.
    pub sent: i64,
    /// Jobs marked failed.
    pub failed: i64,
}
