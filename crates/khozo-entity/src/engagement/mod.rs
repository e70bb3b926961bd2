//! Engagement events feeding the counters and the trending ranking.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use khozo_core::AppError;

/// Kind of engagement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "engagement_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EngagementKind {
    /// The opportunity was opened.
    View,
    /// The opportunity was bookmarked.
    Save,
    /// The opportunity was shared.
    Share,
    /// The owner moved it to `applied`.
    Application,
}

impl EngagementKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Save => "save",
            Self::Share => "share",
            Self::Application => "application",
        }
    }
}

impl fmt::Display for EngagementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EngagementKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Self::View),
            "save" => Ok(Self::Save),
            "share" => Ok(Self::Share),
            "application" => Ok(Self::Application),
            _ => Err(AppError::validation(format!(
                "Invalid engagement type: '{s}'. Expected one of: view, save, share"
            ))),
        }
    }
}

/// One engagement event.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EngagementEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// The opportunity engaged with.
    pub opportunity_id: Uuid,
    /// The acting user.
    pub user_id: Uuid,
    /// What happened.
    pub kind: EngagementKind,
    /// When.
    pub created_at: DateTime<Utc>,
}

impl EngagementEvent {
    /// Create an event stamped at `now`.
    pub fn new(opportunity_id: Uuid, user_id: Uuid, kind: EngagementKind, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            opportunity_id,
            user_id,
            kind,
            created_at: now,
        }
    }
}

/// Per-opportunity event totals inside a time window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EngagementCounts {
    /// The opportunity.
    pub opportunity_id: Uuid,
    /// View events.
    pub views: i64,
    /// Save events.
    pub saves: i64,
    /// Application events.
    pub applications: i64,
}

impl EngagementCounts {
    /// The trending engagement metric.
    pub fn engagement(&self) -> i64 {
        self.views + self.saves + self.applications
    }
}
