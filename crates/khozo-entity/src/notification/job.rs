//! Notification job (queue entry) model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::{NotificationJobStatus, NotificationPriority};
use crate::opportunity::NotificationChannel;

/// A single scheduled delivery attempt.
///
/// Only `status`, `failure_reason` and `delivered_at` change after creation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationJob {
    /// Unique job identifier.
    pub id: Uuid,
    /// The opportunity this reminder is about.
    pub opportunity_id: Uuid,
    /// The recipient (opportunity owner).
    pub user_id: Uuid,
    /// Delivery channel.
    pub channel: NotificationChannel,
    /// Earliest dispatch time.
    pub scheduled_for: DateTime<Utc>,
    /// Priority tier.
    pub priority: NotificationPriority,
    /// Secondary ordering key within a tier.
    pub relevance_score: f64,
    /// Delivery status.
    pub status: NotificationJobStatus,
    /// Rendered title.
    pub title: String,
    /// Rendered body.
    pub body: String,
    /// Offset this reminder was computed from; `None` for status-change notices.
    pub days_before: Option<i32>,
    /// Why delivery failed.
    pub failure_reason: Option<String>,
    /// When delivery succeeded.
    pub delivered_at: Option<DateTime<Utc>>,
    /// When the job was enqueued.
    pub created_at: DateTime<Utc>,
}

impl NotificationJob {
    /// Materialise a pending job from creation input.
    pub fn from_new(input: NewNotificationJob, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            opportunity_id: input.opportunity_id,
            user_id: input.user_id,
            channel: input.channel,
            scheduled_for: input.scheduled_for,
            priority: input.priority,
            relevance_score: input.relevance_score,
            status: NotificationJobStatus::Pending,
            title: input.title,
            body: input.body,
            days_before: input.days_before,
            failure_reason: None,
            delivered_at: None,
            created_at: now,
        }
    }

    /// Whether the job is pending and its time has come.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.status == NotificationJobStatus::Pending && self.scheduled_for <= now
    }
}

/// Input for enqueueing a job.
#[derive(Debug, Clone)]
pub struct NewNotificationJob {
    /// The opportunity.
    pub opportunity_id: Uuid,
    /// The recipient.
    pub user_id: Uuid,
    /// Channel.
    pub channel: NotificationChannel,
    /// Dispatch time.
    pub scheduled_for: DateTime<Utc>,
    /// Priority tier.
    pub priority: NotificationPriority,
    /// Relevance score.
    pub relevance_score: f64,
    /// Title.
    pub title: String,
    /// Body.
    pub body: String,
    /// Source offset.
    pub days_before: Option<i32>,
}
