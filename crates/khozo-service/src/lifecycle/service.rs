//! Status transitions with audit history and notification side effects.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::config::LifecycleConfig;
use khozo_core::result::AppResult;
use khozo_core::traits::Clock;
use khozo_database::store::{
    EngagementStore, NotificationJobStore, OpportunityStore, StatusHistoryStore,
};
use khozo_entity::engagement::{EngagementEvent, EngagementKind};
use khozo_entity::history::StatusHistoryEntry;
use khozo_entity::notification::NotificationJob;
use khozo_entity::opportunity::{ApplicationStatus, Opportunity};

use crate::context::RequestContext;
use crate::notification::render;
use crate::opportunity::load_owned;

/// Result of a status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionOutcome {
    /// Status before the change.
    pub previous_status: ApplicationStatus,
    /// Status after the change.
    pub new_status: ApplicationStatus,
}

/// Moves opportunities through their lifecycle.
#[derive(Debug, Clone)]
pub struct LifecycleService {
    opportunities: Arc<dyn OpportunityStore>,
    history: Arc<dyn StatusHistoryStore>,
    jobs: Arc<dyn NotificationJobStore>,
    engagement: Arc<dyn EngagementStore>,
    clock: Arc<dyn Clock>,
    config: LifecycleConfig,
}

impl LifecycleService {
    /// Creates a new lifecycle service.
    pub fn new(
        opportunities: Arc<dyn OpportunityStore>,
        history: Arc<dyn StatusHistoryStore>,
        jobs: Arc<dyn NotificationJobStore>,
        engagement: Arc<dyn EngagementStore>,
        clock: Arc<dyn Clock>,
        config: LifecycleConfig,
    ) -> Self {
        Self {
            opportunities,
            history,
            jobs,
            engagement,
            clock,
            config,
        }
    }

    /// Move one of the caller's opportunities to `requested`.
    ///
    /// The status write is the only step whose failure fails the call.
    /// History, job dismissal, status notices and the application event
    /// are each attempted afterwards and only logged when they fail.
    pub async fn transition(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
        requested: &str,
        reason: Option<String>,
    ) -> AppResult<TransitionOutcome> {
        let new_status: ApplicationStatus = requested.parse()?;
        let opportunity = load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;
        let previous_status = opportunity.status;

        if !previous_status.can_transition_to(new_status) {
            if self.config.strict_transitions {
                return Err(AppError::invalid_status(format!(
                    "Transition from {previous_status} to {new_status} is not permitted"
                )));
            }
            warn!(
                opportunity_id = %opportunity_id,
                from = %previous_status,
                to = %new_status,
                "Transition outside the permitted table"
            );
        }

        let now = self.clock.now();
        self.opportunities
            .update_status(opportunity_id, new_status, now)
            .await?;

        info!(
            opportunity_id = %opportunity_id,
            from = %previous_status,
            to = %new_status,
            "Opportunity status changed"
        );

        let entry = StatusHistoryEntry::new(
            opportunity_id,
            previous_status,
            new_status,
            ctx.user_id,
            reason,
            now,
        );
        if let Err(e) = self.history.append(&entry).await {
            warn!(opportunity_id = %opportunity_id, error = %e, "Failed to write status history");
        }

        self.apply_side_effects(ctx, &opportunity, new_status).await;

        Ok(TransitionOutcome {
            previous_status,
            new_status,
        })
    }

    /// Status history of one of the caller's opportunities, oldest first.
    pub async fn history(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
    ) -> AppResult<Vec<StatusHistoryEntry>> {
        load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;
        self.history.list_for_opportunity(opportunity_id).await
    }

    async fn apply_side_effects(
        &self,
        ctx: &RequestContext,
        opportunity: &Opportunity,
        new_status: ApplicationStatus,
    ) {
        let now = self.clock.now();

        if new_status.is_terminal() {
            match self.jobs.dismiss_pending_for_opportunity(opportunity.id).await {
                Ok(dismissed) => {
                    info!(opportunity_id = %opportunity.id, dismissed, "Pending reminders dismissed")
                }
                Err(e) => {
                    warn!(opportunity_id = %opportunity.id, error = %e, "Failed to dismiss pending reminders")
                }
            }
        }

        for input in render::status_notice_jobs(opportunity, new_status, now) {
            let job = NotificationJob::from_new(input, now);
            if let Err(e) = self.jobs.create(&job).await {
                warn!(opportunity_id = %opportunity.id, error = %e, "Failed to enqueue status notice");
            }
        }

        if new_status == ApplicationStatus::Applied {
            let event =
                EngagementEvent::new(opportunity.id, ctx.user_id, EngagementKind::Application, now);
            if let Err(e) = self.engagement.record(&event).await {
                warn!(opportunity_id = %opportunity.id, error = %e, "Failed to record application event");
            }
        }
    }
}
