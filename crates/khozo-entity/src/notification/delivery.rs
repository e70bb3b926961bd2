//! Delivery record shown in the user's notification centre.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::opportunity::NotificationChannel;

/// A successfully delivered notification.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeliveryRecord {
    /// Unique record identifier.
    pub id: Uuid,
    /// The job that produced this record.
    pub job_id: Uuid,
    /// The recipient.
    pub user_id: Uuid,
    /// The opportunity.
    pub opportunity_id: Uuid,
    /// Channel the job was delivered on.
    pub channel: NotificationChannel,
    /// Title.
    pub title: String,
    /// Body.
    pub body: String,
    /// When delivered.
    pub delivered_at: DateTime<Utc>,
    /// When the user read it.
    pub read_at: Option<DateTime<Utc>>,
}

impl DeliveryRecord {
    /// Check if the record has been read.
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }
}
