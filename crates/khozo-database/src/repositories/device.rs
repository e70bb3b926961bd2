//! Device token repository implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_entity::notification::DeviceToken;

use crate::store::DeviceTokenStore;

/// Repository for push device tokens.
#[derive(Debug, Clone)]
pub struct DeviceTokenRepository {
    pool: PgPool,
}

impl DeviceTokenRepository {
    /// Create a new device token repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceTokenStore for DeviceTokenRepository {
    async fn register(
        &self,
        user_id: Uuid,
        token: &str,
        platform: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<DeviceToken> {
        sqlx::query_as::<_, DeviceToken>(
            "INSERT INTO device_tokens (id, user_id, token, platform, is_active, created_at) \
             VALUES ($1, $2, $3, $4, TRUE, $5) \
             ON CONFLICT (token) DO UPDATE SET user_id = EXCLUDED.user_id, \
             platform = EXCLUDED.platform, is_active = TRUE \
             RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(token)
        .bind(platform)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register device", e))
    }

    async fn unregister(&self, user_id: Uuid, token: &str) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM device_tokens WHERE user_id = $1 AND token = $2")
            .bind(user_id)
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to unregister device", e)
            })?;
        Ok(result.rows_affected() > 0)
    }

    async fn active_for_user(&self, user_id: Uuid) -> AppResult<Vec<DeviceToken>> {
        sqlx::query_as::<_, DeviceToken>(
            "SELECT * FROM device_tokens WHERE user_id = $1 AND is_active ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list devices", e))
    }

    async fn deactivate(&self, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE device_tokens SET is_active = FALSE WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to deactivate device", e)
            })?;
        Ok(())
    }

    async fn touch(&self, token: &str, now: DateTime<Utc>) -> AppResult<()> {
        sqlx::query("UPDATE device_tokens SET last_used_at = $2 WHERE token = $1")
            .bind(token)
            .bind(now)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to touch device", e))?;
        Ok(())
    }
}
