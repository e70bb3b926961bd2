//! Application lifecycle status and its permitted-transition table.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use khozo_core::AppError;

/// Lifecycle state of a tracked opportunity.
///
/// Initial state is [`Discovered`](Self::Discovered); the only terminal
/// state is [`Archived`](Self::Archived).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Tracked but not yet applied for.
    Discovered,
    /// Application submitted.
    Applied,
    /// The application correction window is open.
    CorrectionWindow,
    /// Admit card is available for download.
    AdmitCardReleased,
    /// The exam has been taken.
    ExamCompleted,
    /// Awaiting results.
    ResultPending,
    /// Results are out.
    ResultReleased,
    /// Retired; no further transitions.
    Archived,
}

impl ApplicationStatus {
    /// Every state, in lifecycle order.
    pub const ALL: [ApplicationStatus; 8] = [
        Self::Discovered,
        Self::Applied,
        Self::CorrectionWindow,
        Self::AdmitCardReleased,
        Self::ExamCompleted,
        Self::ResultPending,
        Self::ResultReleased,
        Self::Archived,
    ];

    /// States reachable from `self` without a warning.
    ///
    /// Forward skips are allowed because not every opportunity passes
    /// through every stage (schemes have no admit card, jobs have no
    /// correction window). `Archived` is reachable from every other state.
    pub fn allowed_next(&self) -> &'static [ApplicationStatus] {
        use ApplicationStatus::*;
        match self {
            Discovered => &[Applied, ExamCompleted, Archived],
            Applied => &[
                CorrectionWindow,
                AdmitCardReleased,
                ExamCompleted,
                ResultPending,
                Archived,
            ],
            CorrectionWindow => &[AdmitCardReleased, ExamCompleted, Archived],
            AdmitCardReleased => &[ExamCompleted, Archived],
            ExamCompleted => &[ResultPending, ResultReleased, Archived],
            ResultPending => &[ResultReleased, Archived],
            ResultReleased => &[Archived],
            Archived => &[],
        }
    }

    /// Whether `next` is in the permitted-transition table for `self`.
    pub fn can_transition_to(&self, next: ApplicationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    /// Whether this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }

    /// Whether entering this state warrants a user-facing notification.
    pub fn is_significant(&self) -> bool {
        matches!(self, Self::AdmitCardReleased | Self::ResultReleased)
    }

    /// Return the status as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Applied => "applied",
            Self::CorrectionWindow => "correction_window",
            Self::AdmitCardReleased => "admit_card_released",
            Self::ExamCompleted => "exam_completed",
            Self::ResultPending => "result_pending",
            Self::ResultReleased => "result_released",
            Self::Archived => "archived",
        }
    }

    /// Human-readable label used in notification text.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Discovered => "Discovered",
            Self::Applied => "Applied",
            Self::CorrectionWindow => "Correction window open",
            Self::AdmitCardReleased => "Admit card released",
            Self::ExamCompleted => "Exam completed",
            Self::ResultPending => "Result pending",
            Self::ResultReleased => "Result released",
            Self::Archived => "Archived",
        }
    }
}

impl Default for ApplicationStatus {
    fn default() -> Self {
        Self::Discovered
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| AppError::invalid_status(format!("Unknown status: '{s}'")))
    }
}
