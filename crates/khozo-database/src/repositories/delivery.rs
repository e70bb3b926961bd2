//! Delivery record repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_entity::notification::DeliveryRecord;

use crate::store::DeliveryStore;

/// Repository for the notification centre.
#[derive(Debug, Clone)]
pub struct DeliveryRepository {
    pool: PgPool,
}

impl DeliveryRepository {
    /// Create a new delivery repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeliveryStore for DeliveryRepository {
    async fn record(&self, record: &DeliveryRecord) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO delivery_records (id, job_id, user_id, opportunity_id, channel, title, \
             body, delivered_at, read_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(record.id)
        .bind(record.job_id)
        .bind(record.user_id)
        .bind(record.opportunity_id)
        .bind(record.channel)
        .bind(&record.title)
        .bind(&record.body)
        .bind(record.delivered_at)
        .bind(record.read_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record delivery", e))?;
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DeliveryRecord>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM delivery_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count deliveries", e)
                })?;

        let items = sqlx::query_as::<_, DeliveryRecord>(
            "SELECT * FROM delivery_records WHERE user_id = $1 \
             ORDER BY delivered_at DESC, id LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list deliveries", e))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    async fn mark_read(&self, id: Uuid, user_id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE delivery_records SET read_at = COALESCE(read_at, $3) \
             WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_unread(&self, user_id: Uuid) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM delivery_records WHERE user_id = $1 AND read_at IS NULL",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))?;
        Ok(count as u64)
    }
}
