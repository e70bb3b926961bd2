//! Opportunity tracking and ownership checks.

pub mod access;
pub mod service;

pub use access::load_owned;
pub use service::{CreateOpportunity, OpportunityService};
