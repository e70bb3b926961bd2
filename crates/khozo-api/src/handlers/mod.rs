//! HTTP request handlers, one module per domain.

pub mod device;
pub mod engagement;
pub mod health;
pub mod internal;
pub mod lifecycle;
pub mod notification;
pub mod opportunity;
pub mod related;
pub mod trending;
