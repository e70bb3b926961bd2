//! Engagement tracking and viewing history.

pub mod service;

pub use service::EngagementService;
