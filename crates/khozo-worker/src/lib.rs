//! Background task processing for Sarkari Khozo.
//!
//! This crate provides:
//! - A task executor that dispatches named tasks to their handler
//! - A cron scheduler that triggers tasks on their configured schedule
//! - A worker runner that owns both and stops on the shutdown signal
//! - The built-in tasks: notification dispatch and full reschedule

pub mod executor;
pub mod runner;
pub mod scheduler;
pub mod tasks;

pub use executor::{TaskExecutionError, TaskExecutor, TaskHandler};
pub use runner::WorkerRunner;
pub use scheduler::CronScheduler;
