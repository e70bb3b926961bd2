//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Cron-driven background worker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Cron expression (with seconds) for the notification dispatch drain.
    #[serde(default = "default_dispatch_cron")]
    pub dispatch_cron: String,
    /// Cron expression (with seconds) for the full reschedule pass.
    #[serde(default = "default_reschedule_cron")]
    pub reschedule_cron: String,
    /// Jobs drained per dispatch tick.
    #[serde(default = "default_batch_size")]
    pub dispatch_batch_size: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dispatch_cron: default_dispatch_cron(),
            reschedule_cron: default_reschedule_cron(),
            dispatch_batch_size: default_batch_size(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_dispatch_cron() -> String {
    "0 */5 * * * *".to_string()
}

fn default_reschedule_cron() -> String {
    "0 30 2 * * *".to_string()
}

fn default_batch_size() -> usize {
    100
}
