//! Notification job repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_entity::notification::NotificationJob;

use crate::store::NotificationJobStore;

/// Repository for the notification job queue.
///
/// The `seq` column is not part of the entity; it carries insertion order
/// for tie-breaking.
#[derive(Debug, Clone)]
pub struct NotificationJobRepository {
    pool: PgPool,
}

impl NotificationJobRepository {
    /// Create a new notification job repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// A claimed row with its insertion sequence.
#[derive(Debug, sqlx::FromRow)]
struct ClaimedJob {
    seq: i64,
    #[sqlx(flatten)]
    job: NotificationJob,
}

#[async_trait]
impl NotificationJobStore for NotificationJobRepository {
    async fn create(&self, job: &NotificationJob) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO notification_jobs (id, opportunity_id, user_id, channel, scheduled_for, \
             priority, relevance_score, status, title, body, days_before, failure_reason, \
             delivered_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)",
        )
        .bind(job.id)
        .bind(job.opportunity_id)
        .bind(job.user_id)
        .bind(job.channel)
        .bind(job.scheduled_for)
        .bind(job.priority)
        .bind(job.relevance_score)
        .bind(job.status)
        .bind(&job.title)
        .bind(&job.body)
        .bind(job.days_before)
        .bind(&job.failure_reason)
        .bind(job.delivered_at)
        .bind(job.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create job", e))?;
        Ok(())
    }

    async fn dismiss_pending_for_opportunity(&self, opportunity_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'dismissed' \
             WHERE opportunity_id = $1 AND status = 'pending'",
        )
        .bind(opportunity_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to dismiss jobs", e))?;
        Ok(result.rows_affected())
    }

    async fn dismiss_pending_reminders(&self, opportunity_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'dismissed' \
             WHERE opportunity_id = $1 AND status = 'pending' AND days_before IS NOT NULL",
        )
        .bind(opportunity_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to dismiss reminders", e))?;
        Ok(result.rows_affected())
    }

    async fn claim_due(&self, now: DateTime<Utc>, limit: u64) -> AppResult<Vec<NotificationJob>> {
        // RETURNING does not preserve the subquery order, so sort afterwards.
        let mut claimed = sqlx::query_as::<_, ClaimedJob>(
            "UPDATE notification_jobs SET status = 'dispatching' \
             WHERE id IN ( \
                 SELECT id FROM notification_jobs \
                 WHERE status = 'pending' AND scheduled_for <= $1 \
                 ORDER BY priority DESC, relevance_score DESC, seq ASC \
                 LIMIT $2 \
                 FOR UPDATE SKIP LOCKED \
             ) \
             RETURNING *",
        )
        .bind(now)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to claim due jobs", e))?;

        claimed.sort_by(|a, b| {
            b.job
                .priority
                .cmp(&a.job.priority)
                .then_with(|| b.job.relevance_score.total_cmp(&a.job.relevance_score))
                .then_with(|| a.seq.cmp(&b.seq))
        });
        Ok(claimed.into_iter().map(|c| c.job).collect())
    }

    async fn mark_sent(&self, id: Uuid, delivered_at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'sent', delivered_at = $2 \
             WHERE id = $1 AND status = 'dispatching'",
        )
        .bind(id)
        .bind(delivered_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job sent", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn mark_failed(&self, id: Uuid, reason: &str) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE notification_jobs SET status = 'failed', failure_reason = $2 \
             WHERE id = $1 AND status = 'dispatching'",
        )
        .bind(id)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark job failed", e))?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_for_opportunity(&self, opportunity_id: Uuid) -> AppResult<Vec<NotificationJob>> {
        sqlx::query_as::<_, NotificationJob>(
            "SELECT * FROM notification_jobs WHERE opportunity_id = $1 ORDER BY seq",
        )
        .bind(opportunity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list jobs", e))
    }
}
