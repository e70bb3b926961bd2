//! PostgreSQL implementations of the store traits.

pub mod delivery;
pub mod device;
pub mod dispatch_stats;
pub mod engagement;
pub mod job;
pub mod opportunity;
pub mod status_history;
pub mod viewing_history;

pub use delivery::DeliveryRepository;
pub use device::DeviceTokenRepository;
pub use dispatch_stats::DispatchStatsRepository;
pub use engagement::EngagementRepository;
pub use job::NotificationJobRepository;
pub use opportunity::OpportunityRepository;
pub use status_history::StatusHistoryRepository;
pub use viewing_history::ViewingHistoryRepository;
