//! Reminder scheduling, dispatch, the notification centre and device
//! registration.

pub mod centre;
pub mod devices;
pub mod dispatcher;
pub mod render;
pub mod scheduler;

pub use centre::NotificationCentreService;
pub use devices::DeviceService;
pub use dispatcher::{DispatchSummary, NotificationDispatcher};
pub use scheduler::{NotificationScheduler, ScheduleOutcome};
