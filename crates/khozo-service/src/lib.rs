//! # khozo-service
//!
//! Business logic service layer for Sarkari Khozo. Each service works
//! against the store traits of `khozo-database`; the five core components
//! (lifecycle, scheduler, dispatcher, related, trending) never call one
//! another and integrate only through the store.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod engagement;
pub mod lifecycle;
pub mod notification;
pub mod opportunity;
pub mod related;
pub mod trending;

#[cfg(test)]
pub(crate) mod testing;

pub use context::RequestContext;
pub use engagement::EngagementService;
pub use lifecycle::{LifecycleService, TransitionOutcome};
pub use notification::{
    DeviceService, DispatchSummary, NotificationCentreService, NotificationDispatcher,
    NotificationScheduler, ScheduleOutcome,
};
pub use opportunity::{CreateOpportunity, OpportunityService};
pub use related::{RelatedItem, RelatedQuery, RelatedService};
pub use trending::{TimeWindow, TrendingItem, TrendingOverview, TrendingService};
