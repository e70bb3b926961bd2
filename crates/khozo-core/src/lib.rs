//! # khozo-core
//!
//! Core crate for Sarkari Khozo. Contains the configuration schemas,
//! the unified error system, pagination types, and the traits that
//! other crates implement (cache backends, push gateways, clocks).
//!
//! This crate has **no** internal dependencies on other Khozo crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
