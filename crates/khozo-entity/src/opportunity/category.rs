//! Opportunity category and kind enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Subject-matter category of an opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "opportunity_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OpportunityCategory {
    /// Competitive or recruitment examination.
    Exam,
    /// Government job listing.
    Job,
    /// Welfare or benefit scheme.
    Scheme,
    /// Government policy.
    Policy,
    /// Startup programme or grant.
    Startup,
    /// Legal entitlement or process.
    Legal,
    /// Anything else.
    Other,
}

impl OpportunityCategory {
    /// Return the category as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exam => "exam",
            Self::Job => "job",
            Self::Scheme => "scheme",
            Self::Policy => "policy",
            Self::Startup => "startup",
            Self::Legal => "legal",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for OpportunityCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpportunityCategory {
    type Err = khozo_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exam" => Ok(Self::Exam),
            "job" => Ok(Self::Job),
            "scheme" => Ok(Self::Scheme),
            "policy" => Ok(Self::Policy),
            "startup" => Ok(Self::Startup),
            "legal" => Ok(Self::Legal),
            "other" => Ok(Self::Other),
            _ => Err(khozo_core::AppError::validation(format!(
                "Invalid category: '{s}'. Expected one of: exam, job, scheme, policy, startup, legal, other"
            ))),
        }
    }
}

/// How the record came to be tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "opportunity_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OpportunityKind {
    /// Resolved from a free-text query (exam or job application).
    Application,
    /// Picked from the pre-listed schemes.
    Scheme,
    /// Picked from the pre-listed programmes.
    Program,
}

impl OpportunityKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Scheme => "scheme",
            Self::Program => "program",
        }
    }
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OpportunityKind {
    type Err = khozo_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "application" => Ok(Self::Application),
            "scheme" => Ok(Self::Scheme),
            "program" => Ok(Self::Program),
            _ => Err(khozo_core::AppError::validation(format!(
                "Invalid type: '{s}'. Expected one of: application, scheme, program"
            ))),
        }
    }
}
