//! View / save / share tracking and the user's viewing history.

use std::sync::Arc;

use tracing::{debug, warn};
use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::result::AppResult;
use khozo_core::traits::Clock;
use khozo_database::store::{EngagementStore, OpportunityStore, ViewingHistoryStore};
use khozo_entity::engagement::{EngagementEvent, EngagementKind};
use khozo_entity::history::ViewingHistoryEntry;

use crate::context::RequestContext;
use crate::opportunity::load_owned;

/// Largest page of viewing history returned at once.
const MAX_RECENT_VIEWS: u64 = 100;

/// Records engagement and per-user viewing history.
#[derive(Debug, Clone)]
pub struct EngagementService {
    opportunities: Arc<dyn OpportunityStore>,
    engagement: Arc<dyn EngagementStore>,
    viewing_history: Arc<dyn ViewingHistoryStore>,
    clock: Arc<dyn Clock>,
}

impl EngagementService {
    /// Creates a new engagement service.
    pub fn new(
        opportunities: Arc<dyn OpportunityStore>,
        engagement: Arc<dyn EngagementStore>,
        viewing_history: Arc<dyn ViewingHistoryStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            opportunities,
            engagement,
            viewing_history,
            clock,
        }
    }

    /// Record a view, save or share of any existing opportunity.
    ///
    /// Application events are only produced by the `applied` transition.
    pub async fn track(
        &self,
        ctx: &RequestContext,
        opportunity_id: Uuid,
        kind: &str,
    ) -> AppResult<EngagementKind> {
        let kind: EngagementKind = kind.parse()?;
        if kind == EngagementKind::Application {
            return Err(AppError::validation(
                "Application events are recorded by the lifecycle, not tracked directly",
            ));
        }

        load_owned(self.opportunities.as_ref(), ctx, opportunity_id).await?;

        let now = self.clock.now();
        self.engagement
            .record(&EngagementEvent::new(opportunity_id, ctx.user_id, kind, now))
            .await?;
        self.opportunities
            .increment_counter(opportunity_id, kind)
            .await?;

        if kind == EngagementKind::View {
            let entry = ViewingHistoryEntry {
                id: Uuid::new_v4(),
                user_id: ctx.user_id,
                opportunity_id,
                viewed_at: now,
            };
            if let Err(e) = self.viewing_history.record(&entry).await {
                warn!(opportunity_id = %opportunity_id, error = %e, "Failed to write viewing history");
            }
        }

        debug!(opportunity_id = %opportunity_id, kind = %kind, "Engagement tracked");
        Ok(kind)
    }

    /// The caller's most recent views, newest first.
    pub async fn recent_views(
        &self,
        ctx: &RequestContext,
        limit: u64,
    ) -> AppResult<Vec<ViewingHistoryEntry>> {
        self.viewing_history
            .recent_for_user(ctx.user_id, limit.clamp(1, MAX_RECENT_VIEWS))
            .await
    }

    /// Forget the caller's viewing history. Aggregate counters are kept.
    pub async fn clear_history(&self, ctx: &RequestContext) -> AppResult<u64> {
        let removed = self.viewing_history.clear_for_user(ctx.user_id).await?;
        debug!(user_id = %ctx.user_id, removed, "Viewing history cleared");
        Ok(removed)
    }
}
