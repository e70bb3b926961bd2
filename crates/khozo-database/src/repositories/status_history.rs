//! Status history repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_entity::history::StatusHistoryEntry;

use crate::store::StatusHistoryStore;

/// Repository for the append-only status audit.
#[derive(Debug, Clone)]
pub struct StatusHistoryRepository {
    pool: PgPool,
}

impl StatusHistoryRepository {
    /// Create a new status history repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatusHistoryStore for StatusHistoryRepository {
    async fn append(&self, entry: &StatusHistoryEntry) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO status_history (id, opportunity_id, previous_status, new_status, \
             changed_by, reason, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(entry.id)
        .bind(entry.opportunity_id)
        .bind(entry.previous_status)
        .bind(entry.new_status)
        .bind(entry.changed_by)
        .bind(&entry.reason)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to append history", e))?;
        Ok(())
    }

    async fn list_for_opportunity(
        &self,
        opportunity_id: Uuid,
    ) -> AppResult<Vec<StatusHistoryEntry>> {
        sqlx::query_as::<_, StatusHistoryEntry>(
            "SELECT * FROM status_history WHERE opportunity_id = $1 ORDER BY created_at, id",
        )
        .bind(opportunity_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list history", e))
    }
}
