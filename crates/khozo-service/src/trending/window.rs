//! Trending time windows.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use khozo_core::AppError;

/// Length of the engagement window a trending list covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// The last 24 hours.
    Day,
    /// The last 7 days.
    Week,
}

impl TimeWindow {
    /// Length of the window.
    pub fn duration(&self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
        }
    }

    /// Return the window as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
        }
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        Self::Week
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "day" | "24h" => Ok(Self::Day),
            "week" | "7d" => Ok(Self::Week),
            _ => Err(AppError::validation(format!(
                "Invalid time window: '{s}'. Expected one of: day, week"
            ))),
        }
    }
}
