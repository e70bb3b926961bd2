//! Engagement event repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_entity::engagement::{EngagementCounts, EngagementEvent};

use crate::store::EngagementStore;

/// Repository for engagement events.
#[derive(Debug, Clone)]
pub struct EngagementRepository {
    pool: PgPool,
}

impl EngagementRepository {
    /// Create a new engagement repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EngagementStore for EngagementRepository {
    async fn record(&self, event: &EngagementEvent) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO engagement_events (id, opportunity_id, user_id, kind, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(event.id)
        .bind(event.opportunity_id)
        .bind(event.user_id)
        .bind(event.kind)
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record engagement", e))?;
        Ok(())
    }

    async fn counts_between(
        &self,
        user_id: Uuid,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<EngagementCounts>> {
        sqlx::query_as::<_, EngagementCounts>(
            "SELECT opportunity_id, \
             COUNT(*) FILTER (WHERE kind = 'view') AS views, \
             COUNT(*) FILTER (WHERE kind = 'save') AS saves, \
             COUNT(*) FILTER (WHERE kind = 'application') AS applications \
             FROM engagement_events \
             WHERE user_id = $1 AND created_at > $2 AND created_at <= $3 \
             AND kind IN ('view', 'save', 'application') \
             GROUP BY opportunity_id",
        )
        .bind(user_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count engagement", e))
    }
}
