//! # khozo-cache
//!
//! Cache provider for Sarkari Khozo. The only backend is an in-process
//! [moka](https://crates.io/crates/moka) cache with per-entry TTLs; it is
//! owned by the application state and a miss is always safe.

pub mod keys;
pub mod memory;
pub mod provider;

pub use provider::CacheManager;
