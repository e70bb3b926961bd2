//! # khozo-api
//!
//! HTTP API layer for Sarkari Khozo built on Axum.
//!
//! Provides the REST endpoints for opportunity tracking, lifecycle
//! transitions, reminders, related content and trending, plus the
//! middleware stack (logging, CORS, compression), extractors, DTOs and
//! error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state, open_stores, run_server};
pub use state::AppState;
