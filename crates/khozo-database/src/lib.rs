//! # khozo-database
//!
//! Persistence for Sarkari Khozo. The [`store`] module defines one async
//! trait per aggregate; [`repositories`] implements them over PostgreSQL
//! and [`memory`] implements them in process for development and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use store::Stores;
