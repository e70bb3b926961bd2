//! Related-content ranking.

pub mod scorer;
pub mod service;

pub use service::{RelatedItem, RelatedQuery, RelatedService};
