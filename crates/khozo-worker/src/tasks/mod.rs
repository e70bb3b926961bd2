//! Built-in task handlers.

pub mod dispatch;
pub mod reschedule;

pub use dispatch::DispatchTask;
pub use reschedule::RescheduleTask;
