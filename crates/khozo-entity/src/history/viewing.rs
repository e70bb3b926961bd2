//! Viewing history entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A record of a user viewing an opportunity.
///
/// Clearing a user's viewing history deletes these rows only; the
/// opportunity counters are left as they are.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ViewingHistoryEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The viewer.
    pub user_id: Uuid,
    /// What was viewed.
    pub opportunity_id: Uuid,
    /// When.
    pub viewed_at: DateTime<Utc>,
}
