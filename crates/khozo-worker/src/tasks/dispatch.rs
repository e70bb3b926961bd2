//! Drains due notification jobs.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use khozo_service::NotificationDispatcher;

use crate::executor::{TaskExecutionError, TaskHandler};

/// Task name of the dispatch drain.
pub const TASK_NAME: &str = "notification_dispatch";

/// Runs one dispatch batch per tick.
#[derive(Debug)]
pub struct DispatchTask {
    dispatcher: Arc<NotificationDispatcher>,
    batch_size: usize,
}

impl DispatchTask {
    /// Create a dispatch task draining `batch_size` jobs per tick.
    pub fn new(dispatcher: Arc<NotificationDispatcher>, batch_size: usize) -> Self {
        Self {
            dispatcher,
            batch_size,
        }
    }
}

#[async_trait]
impl TaskHandler for DispatchTask {
    fn task_name(&self) -> &str {
        TASK_NAME
    }

    async fn execute(&self) -> Result<Value, TaskExecutionError> {
        let summary = self.dispatcher.dispatch_batch(Some(self.batch_size)).await?;
        Ok(serde_json::json!({
            "task": TASK_NAME,
            "sent": summary.sent,
            "failed": summary.failed,
        }))
    }
}
