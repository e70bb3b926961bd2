//! Append-only history entities.

pub mod status;
pub mod viewing;

pub use status::StatusHistoryEntry;
pub use viewing::ViewingHistoryEntry;
