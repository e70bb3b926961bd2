//! Worker runner: registers the built-in tasks on their schedules and runs
//! until the shutdown signal.

use std::sync::Arc;

use tokio::sync::watch;

use khozo_core::config::WorkerConfig;
use khozo_core::result::AppResult;
use khozo_service::{NotificationDispatcher, NotificationScheduler};

use crate::executor::TaskExecutor;
use crate::scheduler::CronScheduler;
use crate::tasks::{DispatchTask, RescheduleTask, dispatch, reschedule};

/// Owns the task executor and drives it from cron.
#[derive(Debug)]
pub struct WorkerRunner {
    executor: Arc<TaskExecutor>,
    config: WorkerConfig,
}

impl WorkerRunner {
    /// Create a runner with the dispatch and reschedule tasks registered.
    pub fn new(
        dispatcher: Arc<NotificationDispatcher>,
        scheduler: Arc<NotificationScheduler>,
        config: WorkerConfig,
    ) -> Self {
        let mut executor = TaskExecutor::new();
        executor.register(Arc::new(DispatchTask::new(
            dispatcher,
            config.dispatch_batch_size,
        )));
        executor.register(Arc::new(RescheduleTask::new(scheduler)));
        Self {
            executor: Arc::new(executor),
            config,
        }
    }

    /// The executor, for running a task outside its schedule.
    pub fn executor(&self) -> &Arc<TaskExecutor> {
        &self.executor
    }

    /// Run the cron schedule until `cancel` turns true.
    pub async fn run(&self, mut cancel: watch::Receiver<bool>) -> AppResult<()> {
        if !self.config.enabled {
            tracing::info!("Background worker disabled");
            return Ok(());
        }

        let mut cron = CronScheduler::new(Arc::clone(&self.executor)).await?;
        cron.register(dispatch::TASK_NAME, &self.config.dispatch_cron)
            .await?;
        cron.register(reschedule::TASK_NAME, &self.config.reschedule_cron)
            .await?;
        cron.start().await?;

        tracing::info!(
            tasks = ?self.executor.registered_tasks(),
            "Background worker started"
        );

        while cancel.changed().await.is_ok() {
            if *cancel.borrow() {
                break;
            }
        }

        tracing::info!("Background worker received shutdown signal");
        cron.shutdown().await
    }
}
