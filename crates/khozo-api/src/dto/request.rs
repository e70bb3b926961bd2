//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use khozo_core::error::AppError;
use khozo_core::result::AppResult;
use khozo_entity::opportunity::{
    Eligibility, ImportantDates, NotificationPreferences, OpportunityCategory, OpportunityKind,
};
use khozo_service::{CreateOpportunity, RelatedQuery, TimeWindow};

/// Run `validator` checks on query parameters.
pub fn validated<T: Validate>(params: T) -> AppResult<T> {
    params
        .validate()
        .map_err(|e| AppError::validation(e.to_string()))?;
    Ok(params)
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be blank".into()));
    }
    Ok(())
}

/// Track a new opportunity.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateOpportunityRequest {
    /// Display title.
    #[validate(
        length(min = 1, max = 300, message = "Title must be 1-300 characters"),
        custom(function = "not_blank")
    )]
    pub title: String,
    /// Description.
    #[validate(length(max = 10000))]
    pub description: Option<String>,
    /// Category.
    pub category: OpportunityCategory,
    /// Record type.
    #[serde(rename = "type", alias = "kind")]
    pub kind: OpportunityKind,
    /// Free-text tags.
    #[serde(default)]
    #[validate(length(max = 50, message = "At most 50 tags are allowed"))]
    pub tags: Vec<String>,
    /// Eligibility criteria.
    #[serde(default)]
    pub eligibility: Eligibility,
    /// Important dates.
    #[serde(default)]
    pub important_dates: ImportantDates,
    /// Reminder preferences; defaults apply when absent.
    pub preferences: Option<NotificationPreferences>,
}

impl From<CreateOpportunityRequest> for CreateOpportunity {
    fn from(req: CreateOpportunityRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            category: req.category,
            kind: req.kind,
            tags: req.tags,
            eligibility: req.eligibility,
            important_dates: req.important_dates,
            preferences: req.preferences,
        }
    }
}

/// Move an opportunity to a new status.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TransitionRequest {
    /// Target status name.
    #[serde(alias = "requestedStatus", alias = "requested_status")]
    pub status: String,
    /// Why the status changed.
    #[validate(length(max = 1000))]
    pub reason: Option<String>,
}

/// Record an engagement event.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TrackRequest {
    /// `view`, `save` or `share`.
    #[serde(alias = "type", alias = "event")]
    #[validate(length(min = 1, max = 32))]
    pub kind: String,
}

/// Register a push token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RegisterDeviceRequest {
    /// Gateway-issued device token.
    #[validate(length(min = 1, max = 4096, message = "Token must be 1-4096 characters"))]
    pub token: String,
    /// Client platform (web, android, ios).
    #[validate(length(max = 32))]
    pub platform: Option<String>,
}

/// Query string of the related-content endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct RelatedParams {
    /// Maximum results.
    #[validate(range(min = 1, max = 50))]
    pub limit: Option<usize>,
    /// Minimum similarity in `[0, 1]`.
    #[serde(alias = "minSimilarity")]
    pub min_similarity: Option<f64>,
    /// Comma-separated record types to keep.
    #[serde(alias = "includeTypes")]
    pub include_types: Option<String>,
}

impl RelatedParams {
    /// Build the service query for `item_id`.
    pub fn into_query(self, item_id: Uuid) -> AppResult<RelatedQuery> {
        let include_types = self
            .include_types
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::parse::<OpportunityKind>)
                    .collect::<AppResult<Vec<_>>>()
            })
            .transpose()?;

        Ok(RelatedQuery {
            item_id,
            limit: self.limit,
            min_similarity: self.min_similarity,
            include_types,
        })
    }
}

/// Query string of the trending endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct TrendingParams {
    /// `day` or `week`; week when absent.
    #[serde(alias = "timeWindow", alias = "time_window")]
    pub window: Option<String>,
    /// Maximum results.
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

impl TrendingParams {
    /// The requested window.
    pub fn time_window(&self) -> AppResult<TimeWindow> {
        self.window
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }
}

/// Query string of the viewing-history endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryParams {
    /// Maximum entries (default 20, max 100).
    #[serde(default = "default_history_limit")]
    pub limit: u64,
}

fn default_history_limit() -> u64 {
    20
}

/// Query string of the dispatch endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DispatchParams {
    /// Maximum jobs; the configured default when absent.
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_params_parse_types() {
        let params = RelatedParams {
            include_types: Some("scheme, program".to_string()),
            ..RelatedParams::default()
        };
        let query = params.into_query(Uuid::nil()).unwrap();
        assert_eq!(
            query.include_types,
            Some(vec![OpportunityKind::Scheme, OpportunityKind::Program])
        );

        let params = RelatedParams {
            include_types: Some("scheme,bogus".to_string()),
            ..RelatedParams::default()
        };
        assert!(params.into_query(Uuid::nil()).is_err());
    }

    #[test]
    fn test_trending_window_defaults_to_week() {
        assert_eq!(TrendingParams::default().time_window().unwrap(), TimeWindow::Week);
        let params = TrendingParams {
            window: Some("day".to_string()),
            limit: None,
        };
        assert_eq!(params.time_window().unwrap(), TimeWindow::Day);
    }

    #[test]
    fn test_blank_title_is_rejected() {
        let req: CreateOpportunityRequest = serde_json::from_value(serde_json::json!({
            "title": "   ",
            "category": "exam",
            "type": "application"
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }
}
