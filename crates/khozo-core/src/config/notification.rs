//! Notification scheduling and push gateway configuration.

use serde::{Deserialize, Serialize};

/// Reminder scheduling and dispatch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Hour of day (UTC) at which reminders fire. 03:30 UTC is 09:00 IST.
    #[serde(default = "default_reminder_hour")]
    pub reminder_hour_utc: u32,
    /// Minute of the hour at which reminders fire.
    #[serde(default = "default_reminder_minute")]
    pub reminder_minute_utc: u32,
    /// Batch size used when `dispatchBatch` is called without a limit.
    #[serde(default = "default_batch_limit")]
    pub default_batch_limit: usize,
    /// Upper bound accepted for a dispatch batch limit.
    #[serde(default = "default_max_batch_limit")]
    pub max_batch_limit: usize,
    /// Push gateway settings.
    #[serde(default)]
    pub push: PushConfig,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            reminder_hour_utc: default_reminder_hour(),
            reminder_minute_utc: default_reminder_minute(),
            default_batch_limit: default_batch_limit(),
            max_batch_limit: default_max_batch_limit(),
            push: PushConfig::default(),
        }
    }
}

/// HTTP push gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// When disabled, push deliveries are logged and reported as delivered.
    #[serde(default)]
    pub enabled: bool,
    /// Gateway endpoint accepting `{token, notification}` JSON posts.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Bearer key presented to the gateway.
    #[serde(default)]
    pub server_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: default_endpoint(),
            server_key: String::new(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_reminder_hour() -> u32 {
    3
}

fn default_reminder_minute() -> u32 {
    30
}

fn default_batch_limit() -> usize {
    100
}

fn default_max_batch_limit() -> usize {
    500
}

fn default_endpoint() -> String {
    "https://fcm.googleapis.com/fcm/send".to_string()
}

fn default_timeout() -> u64 {
    10
}
