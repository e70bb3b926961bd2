//! Application lifecycle: status transitions and their side effects.

pub mod service;

pub use service::{LifecycleService, TransitionOutcome};
