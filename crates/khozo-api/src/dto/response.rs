//! Response DTOs.

use serde::{Deserialize, Serialize};

use khozo_core::types::PageResponse;
use khozo_entity::engagement::EngagementKind;
use khozo_entity::notification::DeliveryRecord;
use khozo_entity::opportunity::NotificationPreferences;
use khozo_service::ScheduleOutcome;

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Whether the store answered.
    pub database: bool,
    /// Whether the cache backend answered.
    pub cache: bool,
}

/// Saved preferences and the scheduling pass they triggered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferencesResponse {
    /// Preferences as stored.
    pub preferences: NotificationPreferences,
    /// Jobs voided and created.
    pub schedule: ScheduleOutcome,
}

/// Notification centre page with the unread badge count.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationListResponse {
    /// Delivered notifications, newest first.
    #[serde(flatten)]
    pub page: PageResponse<DeliveryRecord>,
    /// Unread notifications in total.
    pub unread_count: u64,
}

/// Accepted engagement event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackResponse {
    /// The recorded kind.
    pub kind: EngagementKind,
}

/// Rows removed by a delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovedResponse {
    /// Number of rows removed.
    pub removed: u64,
}

/// Plain acknowledgement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// What happened.
    pub message: String,
}

impl MessageResponse {
    /// Acknowledgement with `message`.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
