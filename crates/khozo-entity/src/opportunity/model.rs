//! Opportunity entity model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::category::{OpportunityCategory, OpportunityKind};
use super::preference::NotificationPreferences;
use super::status::ApplicationStatus;

/// How much a date can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateConfidence {
    /// Taken from an official notification.
    Verified,
    /// Inferred from previous cycles.
    Estimated,
}

/// A single dated milestone with its confidence tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    /// Calendar date of the milestone.
    pub date: NaiveDate,
    /// Confidence in the date.
    #[serde(default = "default_confidence")]
    pub confidence: DateConfidence,
}

impl Milestone {
    /// Create a verified milestone.
    pub fn verified(date: NaiveDate) -> Self {
        Self {
            date,
            confidence: DateConfidence::Verified,
        }
    }

    /// Create an estimated milestone.
    pub fn estimated(date: NaiveDate) -> Self {
        Self {
            date,
            confidence: DateConfidence::Estimated,
        }
    }
}

fn default_confidence() -> DateConfidence {
    DateConfidence::Estimated
}

/// Structured bag of important dates, stored as JSONB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportantDates {
    /// Application window opens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_start: Option<Milestone>,
    /// Application window closes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application_end: Option<Milestone>,
    /// Exam date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exam_date: Option<Milestone>,
    /// Admit card release date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admit_card_date: Option<Milestone>,
    /// Result declaration date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result_date: Option<Milestone>,
}

impl ImportantDates {
    /// The date reminders count down to: application end, else exam date.
    pub fn deadline(&self) -> Option<NaiveDate> {
        self.application_end
            .or(self.exam_date)
            .map(|milestone| milestone.date)
    }
}

/// Eligibility criteria compared by the related-content scorer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eligibility {
    /// Indian state or union territory, if restricted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Minimum age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_min: Option<u32>,
    /// Maximum age in years.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_max: Option<u32>,
    /// Minimum educational qualification.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    /// Gender restriction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
}

/// A tracked opportunity owned by one user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Opportunity {
    /// Unique opportunity identifier.
    pub id: Uuid,
    /// The owning user.
    pub user_id: Uuid,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Subject-matter category.
    pub category: OpportunityCategory,
    /// Record type.
    pub kind: OpportunityKind,
    /// Free-text tags.
    pub tags: Vec<String>,
    /// Eligibility criteria.
    #[sqlx(json)]
    pub eligibility: Eligibility,
    /// Important dates.
    #[sqlx(json)]
    pub important_dates: ImportantDates,
    /// Current lifecycle status.
    pub status: ApplicationStatus,
    /// Total views.
    pub view_count: i64,
    /// Total saves.
    pub save_count: i64,
    /// Total shares.
    pub share_count: i64,
    /// Reminder preferences.
    #[sqlx(json)]
    pub preferences: NotificationPreferences,
    /// When the opportunity was first tracked.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl Opportunity {
    /// Build a fresh `discovered` record from creation input.
    pub fn from_new(input: NewOpportunity, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: input.user_id,
            title: input.title,
            description: input.description,
            category: input.category,
            kind: input.kind,
            tags: input.tags,
            eligibility: input.eligibility,
            important_dates: input.important_dates,
            status: ApplicationStatus::Discovered,
            view_count: 0,
            save_count: 0,
            share_count: 0,
            preferences: input.preferences,
            created_at: now,
            updated_at: now,
        }
    }

    /// The reminder deadline, if any date is known.
    pub fn deadline(&self) -> Option<NaiveDate> {
        self.important_dates.deadline()
    }

    /// Whether `user_id` owns this opportunity.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.user_id == user_id
    }
}

/// Input for tracking a new opportunity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOpportunity {
    /// The owning user.
    pub user_id: Uuid,
    /// Display title.
    pub title: String,
    /// Free-text description.
    pub description: Option<String>,
    /// Category.
    pub category: OpportunityCategory,
    /// Record type.
    pub kind: OpportunityKind,
    /// Tags.
    pub tags: Vec<String>,
    /// Eligibility.
    pub eligibility: Eligibility,
    /// Important dates.
    pub important_dates: ImportantDates,
    /// Reminder preferences.
    pub preferences: NotificationPreferences,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_deadline_prefers_application_end() {
        let dates = ImportantDates {
            application_end: Some(Milestone::verified(date(2025, 12, 1))),
            exam_date: Some(Milestone::estimated(date(2026, 1, 15))),
            ..Default::default()
        };
        assert_eq!(dates.deadline(), Some(date(2025, 12, 1)));
    }

    #[test]
    fn test_deadline_falls_back_to_exam_date() {
        let dates = ImportantDates {
            exam_date: Some(Milestone::estimated(date(2026, 1, 15))),
            result_date: Some(Milestone::estimated(date(2026, 3, 1))),
            ..Default::default()
        };
        assert_eq!(dates.deadline(), Some(date(2026, 1, 15)));
        assert_eq!(ImportantDates::default().deadline(), None);
    }

    #[test]
    fn test_milestone_confidence_defaults_to_estimated() {
        let milestone: Milestone =
            serde_json::from_str(r#"{"date":"2025-12-01"}"#).expect("deserialize");
        assert_eq!(milestone.confidence, DateConfidence::Estimated);
    }
}
