//! Daily dispatch counter repository implementation.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_entity::notification::DailyDispatchStats;

use crate::store::DispatchStatsStore;

/// Repository for daily sent/failed counters.
#[derive(Debug, Clone)]
pub struct DispatchStatsRepository {
    pool: PgPool,
}

impl DispatchStatsRepository {
    /// Create a new dispatch stats repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DispatchStatsStore for DispatchStatsRepository {
    async fn increment(&self, day: NaiveDate, sent: u64, failed: u64) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO daily_dispatch_stats (day, sent, failed) VALUES ($1, $2, $3) \
             ON CONFLICT (day) DO UPDATE SET \
             sent = daily_dispatch_stats.sent + EXCLUDED.sent, \
             failed = daily_dispatch_stats.failed + EXCLUDED.failed",
        )
        .bind(day)
        .bind(sent as i64)
        .bind(failed as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to increment dispatch stats", e)
        })?;
        Ok(())
    }

    async fn get(&self, day: NaiveDate) -> AppResult<Option<DailyDispatchStats>> {
        sqlx::query_as::<_, DailyDispatchStats>("SELECT * FROM daily_dispatch_stats WHERE day = $1")
            .bind(day)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to read dispatch stats", e)
            })
    }
}
