//! Notification queue, delivery and device entities.

pub mod delivery;
pub mod device;
pub mod job;
pub mod stats;
pub mod status;

pub use delivery::DeliveryRecord;
pub use device::DeviceToken;
pub use job::{NewNotificationJob, NotificationJob};
pub use stats::DailyDispatchStats;
pub use status::{NotificationJobStatus, NotificationPriority};
