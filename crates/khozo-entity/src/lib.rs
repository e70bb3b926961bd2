//! # khozo-entity
//!
//! Domain entity models for Sarkari Khozo. Every struct in this crate
//! represents a database table row or a domain value object. All entities
//! derive `Debug`, `Clone`, `Serialize`, `Deserialize`, and database
//! entities additionally derive `sqlx::FromRow`.

pub mod engagement;
pub mod history;
pub mod notification;
pub mod opportunity;
