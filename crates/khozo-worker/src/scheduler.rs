//! Cron scheduler that triggers registered tasks.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};

use khozo_core::error::AppError;

use crate::executor::TaskExecutor;

/// Cron-based trigger for background tasks.
///
/// A tick that fires while the previous run of the same task is still in
/// progress is skipped.
pub struct CronScheduler {
    scheduler: JobScheduler,
    executor: Arc<TaskExecutor>,
    running: HashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler")
            .field("tasks", &self.running.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CronScheduler {
    /// Create a new cron scheduler.
    pub async fn new(executor: Arc<TaskExecutor>) -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self {
            scheduler,
            executor,
            running: HashMap::new(),
        })
    }

    /// Run `task` on the six-field cron `schedule` (seconds first).
    pub async fn register(&mut self, task: &str, schedule: &str) -> Result<(), AppError> {
        if !self.executor.has_handler(task) {
            return Err(AppError::configuration(format!(
                "Cannot schedule unknown task '{task}'"
            )));
        }

        let guard = self
            .running
            .entry(task.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let executor = Arc::clone(&self.executor);
        let name = task.to_string();

        let job = CronJob::new_async(schedule, move |_uuid, _lock| {
            let executor = Arc::clone(&executor);
            let guard = Arc::clone(&guard);
            let name = name.clone();
            Box::pin(async move {
                let Ok(_running) = guard.try_lock() else {
                    tracing::warn!(task = %name, "Previous run still in progress, skipping tick");
                    return;
                };
                executor.run_logged(&name).await;
            })
        })
        .map_err(|e| {
            AppError::configuration(format!("Invalid schedule '{schedule}' for {task}: {e}"))
        })?;

        self.scheduler
            .add(job)
            .await
            .map_err(|e| AppError::internal(format!("Failed to add {task} schedule: {e}")))?;

        tracing::info!(task, schedule, "Registered scheduled task");
        Ok(())
    }

    /// Start the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        tracing::info!("Cron scheduler started");
        Ok(())
    }

    /// Shut the scheduler down.
    pub async fn shutdown(&self) -> Result<(), AppError> {
        let mut scheduler = self.scheduler.clone();
        scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        tracing::info!("Cron scheduler shut down");
        Ok(())
    }
}
