//! Task executor: dispatches named tasks to registered handlers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use khozo_core::error::AppError;

/// A background task.
#[async_trait]
pub trait TaskHandler: Send + Sync + std::fmt::Debug {
    /// Name the task is registered and scheduled under.
    fn task_name(&self) -> &str;

    /// Run the task once; the value summarises what it did.
    async fn execute(&self) -> Result<Value, TaskExecutionError>;
}

/// Error from task execution.
#[derive(Debug, thiserror::Error)]
pub enum TaskExecutionError {
    /// No handler is registered under the name.
    #[error("Unknown task: {0}")]
    UnknownTask(String),

    /// The task ran and failed.
    #[error("Task failed: {0}")]
    Failed(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] AppError),
}

/// Dispatches tasks to the handler registered under their name.
#[derive(Debug, Default)]
pub struct TaskExecutor {
    handlers: HashMap<String, Arc<dyn TaskHandler>>,
}

impl TaskExecutor {
    /// Create an executor with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task handler, replacing any handler with the same name.
    pub fn register(&mut self, handler: Arc<dyn TaskHandler>) {
        let name = handler.task_name().to_string();
        tracing::info!(task = %name, "Registered task handler");
        self.handlers.insert(name, handler);
    }

    /// Run the named task once.
    pub async fn execute(&self, task: &str) -> Result<Value, TaskExecutionError> {
        let handler = self
            .handlers
            .get(task)
            .ok_or_else(|| TaskExecutionError::UnknownTask(task.to_string()))?;

        tracing::debug!(task, "Executing task");
        handler.execute().await
    }

    /// Run the named task and log its outcome.
    pub async fn run_logged(&self, task: &str) {
        match self.execute(task).await {
            Ok(result) => tracing::info!(task, %result, "Task completed"),
            Err(e) => tracing::error!(task, error = %e, "Task failed"),
        }
    }

    /// Check if a handler is registered for a task.
    pub fn has_handler(&self, task: &str) -> bool {
        self.handlers.contains_key(task)
    }

    /// Names of the registered tasks, sorted.
    pub fn registered_tasks(&self) -> Vec<String> {
        let mut names: Vec<String> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}
