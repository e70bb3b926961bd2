//! Core type definitions used across the Khozo workspace.

pub mod pagination;

pub use pagination::{PageRequest, PageResponse};
