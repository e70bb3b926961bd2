//! Tracked opportunity (exam / job / scheme application) entities.

pub mod category;
pub mod model;
pub mod preference;
pub mod status;

pub use category::{OpportunityCategory, OpportunityKind};
pub use model::{DateConfidence, Eligibility, ImportantDates, Milestone, NewOpportunity, Opportunity};
pub use preference::{NotificationChannel, NotificationPreferences};
pub use status::ApplicationStatus;
