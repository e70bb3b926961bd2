//! Convenience result type alias for Sarkari Khozo.

use crate::error::AppError;

/// A specialized `Result` type for Khozo operations.
pub type AppResult<T> = Result<T, AppError>;
