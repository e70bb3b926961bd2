//! Registered push device token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A push token registered by one of the user's devices.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DeviceToken {
    /// Unique row identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: Uuid,
    /// Gateway token.
    pub token: String,
    /// Platform label (android, ios, web).
    pub platform: Option<String>,
    /// Cleared when the gateway reports the token as unregistered.
    pub is_active: bool,
    /// When first registered.
    pub created_at: DateTime<Utc>,
    /// Last successful delivery.
    pub last_used_at: Option<DateTime<Utc>>,
}
