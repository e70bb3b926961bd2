//! Trending ranking over engagement windows.

pub mod service;
pub mod window;

pub use service::{TrendingItem, TrendingOverview, TrendingService};
pub use window::TimeWindow;
