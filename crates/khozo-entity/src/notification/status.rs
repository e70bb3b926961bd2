//! Notification job status and priority enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Delivery status of a queued notification job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_job_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationJobStatus {
    /// Waiting for its scheduled time.
    Pending,
    /// Claimed by a dispatch batch; delivery in progress.
    Dispatching,
    /// Delivered to at least one target.
    Sent,
    /// Delivery failed; final.
    Failed,
    /// Superseded by a reschedule or an archive.
    Dismissed,
}

impl NotificationJobStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Dispatching => "dispatching",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Dismissed => "dismissed",
        }
    }

    /// Whether the job has reached its last state.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Sent | Self::Failed | Self::Dismissed)
    }
}

impl fmt::Display for NotificationJobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Priority tier of a job. Declared in ascending order so that the derived
/// `Ord` and the Postgres enum ordering agree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "notification_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationPriority {
    /// More than a week out.
    Low,
    /// Within a week.
    Normal,
    /// Within three days, or a significant status change.
    High,
    /// Due tomorrow or today.
    Critical,
}

impl NotificationPriority {
    /// Priority tier for a reminder `days_remaining` before the deadline.
    pub fn for_days_remaining(days_remaining: u32) -> Self {
        match days_remaining {
            0..=1 => Self::Critical,
            2..=3 => Self::High,
            4..=7 => Self::Normal,
            _ => Self::Low,
        }
    }

    /// Return the priority as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for NotificationPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
