//! Full reschedule pass over every active opportunity.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use khozo_service::NotificationScheduler;

use crate::executor::{TaskExecutionError, TaskHandler};

/// Task name of the reschedule pass.
pub const TASK_NAME: &str = "notification_reschedule";

/// Rebuilds pending reminders so that offsets which have come into range,
/// or dates that changed, are reflected in the queue.
#[derive(Debug)]
pub struct RescheduleTask {
    scheduler: Arc<NotificationScheduler>,
}

impl RescheduleTask {
    /// Create a reschedule task.
    pub fn new(scheduler: Arc<NotificationScheduler>) -> Self {
        Self { scheduler }
    }
}

#[async_trait]
impl TaskHandler for RescheduleTask {
    fn task_name(&self) -> &str {
        TASK_NAME
    }

    async fn execute(&self) -> Result<Value, TaskExecutionError> {
        let rescheduled = self
            .scheduler
            .reschedule_all()
            .await
            .map_err(|e| TaskExecutionError::Failed(format!("Reschedule pass failed: {e}")))?;
        Ok(serde_json::json!({
            "task": TASK_NAME,
            "rescheduled": rescheduled,
        }))
    }
}
