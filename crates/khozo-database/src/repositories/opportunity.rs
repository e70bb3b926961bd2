//! Opportunity repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_entity::engagement::EngagementKind;
use khozo_entity::opportunity::{
    ApplicationStatus, NotificationPreferences, Opportunity, OpportunityKind,
};

use crate::store::OpportunityStore;

/// Repository for tracked opportunities.
#[derive(Debug, Clone)]
pub struct OpportunityRepository {
    pool: PgPool,
}

impl OpportunityRepository {
    /// Create a new opportunity repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OpportunityStore for OpportunityRepository {
    async fn insert(&self, opportunity: &Opportunity) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO opportunities (id, user_id, title, description, category, kind, tags, \
             eligibility, important_dates, status, view_count, save_count, share_count, \
             preferences, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(opportunity.id)
        .bind(opportunity.user_id)
        .bind(&opportunity.title)
        .bind(&opportunity.description)
        .bind(opportunity.category)
        .bind(opportunity.kind)
        .bind(&opportunity.tags)
        .bind(Json(&opportunity.eligibility))
        .bind(Json(&opportunity.important_dates))
        .bind(opportunity.status)
        .bind(opportunity.view_count)
        .bind(opportunity.save_count)
        .bind(opportunity.share_count)
        .bind(Json(&opportunity.preferences))
        .bind(opportunity.created_at)
        .bind(opportunity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to insert opportunity", e))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Opportunity>> {
        sqlx::query_as::<_, Opportunity>("SELECT * FROM opportunities WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find opportunity", e))
    }

    async fn find_by_ids(&self, ids: &[Uuid]) -> AppResult<Vec<Opportunity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, Opportunity>("SELECT * FROM opportunities WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to fetch opportunities", e)
            })
    }

    async fn find_by_user(
        &self,
        user_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Opportunity>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM opportunities WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count opportunities", e)
            })?;

        let items = sqlx::query_as::<_, Opportunity>(
            "SELECT * FROM opportunities WHERE user_id = $1 \
             ORDER BY created_at DESC, id LIMIT $2 OFFSET $3",
        )
        .bind(user_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list opportunities", e))?;

        Ok(PageResponse::new(items, page.page, page.page_size, total as u64))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: ApplicationStatus,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE opportunities SET status = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(status)
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update status", e)
                })?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Opportunity {id} not found")));
        }
        Ok(())
    }

    async fn update_preferences(
        &self,
        id: Uuid,
        preferences: &NotificationPreferences,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        let result =
            sqlx::query("UPDATE opportunities SET preferences = $2, updated_at = $3 WHERE id = $1")
                .bind(id)
                .bind(Json(preferences))
                .bind(now)
                .execute(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to update preferences", e)
                })?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Opportunity {id} not found")));
        }
        Ok(())
    }

    async fn increment_counter(&self, id: Uuid, kind: EngagementKind) -> AppResult<()> {
        let sql = match kind {
            EngagementKind::View => "UPDATE opportunities SET view_count = view_count + 1 WHERE id = $1",
            EngagementKind::Save => "UPDATE opportunities SET save_count = save_count + 1 WHERE id = $1",
            EngagementKind::Share => {
                "UPDATE opportunities SET share_count = share_count + 1 WHERE id = $1"
            }
            EngagementKind::Application => return Ok(()),
        };
        sqlx::query(sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to increment counter", e))?;
        Ok(())
    }

    async fn list_candidates(
        &self,
        user_id: Uuid,
        exclude_id: Uuid,
        kinds: Option<&[OpportunityKind]>,
        limit: u64,
    ) -> AppResult<Vec<Opportunity>> {
        let kinds: Option<Vec<String>> =
            kinds.map(|k| k.iter().map(|kind| kind.as_str().to_string()).collect());
        sqlx::query_as::<_, Opportunity>(
            "SELECT * FROM opportunities \
             WHERE user_id = $1 AND id <> $2 \
             AND ($3::text[] IS NULL OR kind::text = ANY($3)) \
             ORDER BY created_at DESC, id LIMIT $4",
        )
        .bind(user_id)
        .bind(exclude_id)
        .bind(kinds)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list candidates", e))
    }

    async fn list_active(&self) -> AppResult<Vec<Opportunity>> {
        sqlx::query_as::<_, Opportunity>(
            "SELECT * FROM opportunities WHERE status <> 'archived' ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list active opportunities", e)
        })
    }
}
