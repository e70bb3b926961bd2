//! Custom Axum extractors.

pub mod auth;
pub mod json;
pub mod pagination;
pub mod service_key;

pub use auth::AuthUser;
pub use json::{JsonBody, ValidJson};
pub use pagination::PaginationParams;
pub use service_key::ServiceKey;
