//! Status transition audit entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::opportunity::ApplicationStatus;

/// One recorded lifecycle transition. Never mutated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct StatusHistoryEntry {
    /// Unique entry identifier.
    pub id: Uuid,
    /// The opportunity that changed.
    pub opportunity_id: Uuid,
    /// Status before the transition.
    pub previous_status: ApplicationStatus,
    /// Status after the transition.
    pub new_status: ApplicationStatus,
    /// Who made the change.
    pub changed_by: Uuid,
    /// Optional free-text reason.
    pub reason: Option<String>,
    /// When the transition happened.
    pub created_at: DateTime<Utc>,
}

impl StatusHistoryEntry {
    /// Create a new entry stamped at `now`.
    pub fn new(
        opportunity_id: Uuid,
        previous_status: ApplicationStatus,
        new_status: ApplicationStatus,
        changed_by: Uuid,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            opportunity_id,
            previous_status,
            new_status,
            changed_by,
            reason,
            created_at: now,
        }
    }
}
