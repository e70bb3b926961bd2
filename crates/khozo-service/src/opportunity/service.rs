//! Opportunity tracking (create / list / get).

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use khozo_core::result::AppResult;
use khozo_core::traits::Clock;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_database::store::OpportunityStore;
use khozo_entity::opportunity::{
    Eligibility, ImportantDates, NewOpportunity, NotificationPreferences, Opportunity,
    OpportunityCategory, OpportunityKind,
};

use super::access::load_owned;
use crate::context::RequestContext;
use crate::notification::NotificationScheduler;

/// Input for tracking a new opportunity.
#[derive(Debug, Clone)]
pub struct CreateOpportunity {
    /// Display title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Category.
    pub category: OpportunityCategory,
    /// Record type.
    pub kind: OpportunityKind,
    /// Tags.
    pub tags: Vec<String>,
    /// Eligibility criteria.
    pub eligibility: Eligibility,
    /// Important dates.
    pub important_dates: ImportantDates,
    /// Reminder preferences; defaults apply when absent.
    pub preferences: Option<NotificationPreferences>,
}

/// Tracks opportunities for their owners.
#[derive(Debug, Clone)]
pub struct OpportunityService {
    opportunities: Arc<dyn OpportunityStore>,
    scheduler: Arc<NotificationScheduler>,
    clock: Arc<dyn Clock>,
}

impl OpportunityService {
    /// Creates a new opportunity service.
    pub fn new(
        opportunities: Arc<dyn OpportunityStore>,
        scheduler: Arc<NotificationScheduler>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            opportunities,
            scheduler,
            clock,
        }
    }

    /// Start tracking an opportunity in `discovered` and run the first
    /// scheduling pass.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        input: CreateOpportunity,
    ) -> AppResult<Opportunity> {
        let preferences = input.preferences.unwrap_or_default().checked()?;
        let tags = normalize_tags(input.tags);

        let opportunity = Opportunity::from_new(
            NewOpportunity {
                user_id: ctx.user_id,
                title: input.title.trim().to_string(),
                description: input.description,
                category: input.category,
                kind: input.kind,
                tags,
                eligibility: input.eligibility,
                important_dates: input.important_dates,
                preferences,
            },
            self.clock.now(),
        );
        self.opportunities.insert(&opportunity).await?;

        info!(
            opportunity_id = %opportunity.id,
            user_id = %ctx.user_id,
            category = %opportunity.category,
            "Opportunity tracked"
        );

        if let Err(e) = self.scheduler.schedule(opportunity.id).await {
            warn!(opportunity_id = %opportunity.id, error = %e, "Initial scheduling pass failed");
        }

        Ok(opportunity)
    }

    /// Fetch one of the caller's opportunities.
    pub async fn get(&self, ctx: &RequestContext, opportunity_id: Uuid) -> AppResult<Opportunity> {
        load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await
    }

    /// Page through the caller's opportunities.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Opportunity>> {
        self.opportunities.find_by_user(ctx.user_id, page).await
    }
}

/// Trim, drop empties and deduplicate case-insensitively, keeping first spelling.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}
