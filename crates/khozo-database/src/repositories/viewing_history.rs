//! Viewing history repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_entity::history::ViewingHistoryEntry;

use crate::store::ViewingHistoryStore;

/// Repository for per-user viewing history.
#[derive(Debug, Clone)]
pub struct ViewingHistoryRepository {
    pool: PgPool,
}

impl ViewingHistoryRepository {
    /// Create a new viewing history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ViewingHistoryStore for ViewingHistoryRepository {
    async fn record(&self, entry: &ViewingHistoryEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO viewing_history (id, user_id, opportunity_id, viewed_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.opportunity_id)
        .bind(entry.viewed_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to record view", e))?;
        Ok(())
    }

    async fn recent_for_user(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> AppResult<Vec<ViewingHistoryEntry>> {
        sqlx::query_as::<_, ViewingHistoryEntry>(
            "SELECT * FROM viewing_history WHERE user_id = $1 \
             ORDER BY viewed_at DESC, id LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list views", e))
    }

    async fn clear_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM viewing_history WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to clear history", e))?;
        Ok(result.rows_affected())
    }
}
