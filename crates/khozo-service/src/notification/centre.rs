//! The user's notification centre: delivered notifications and read state.

use std::sync::Arc;

use uuid::Uuid;

use khozo_core::AppError;
use khozo_core::result::AppResult;
use khozo_core::traits::Clock;
use khozo_core::types::{PageRequest, PageResponse};
use khozo_database::store::DeliveryStore;
use khozo_entity::notification::DeliveryRecord;

use crate::context::RequestContext;

/// Reads and acknowledges delivery records.
#[derive(Debug, Clone)]
pub struct NotificationCentreService {
    deliveries: Arc<dyn DeliveryStore>,
    clock: Arc<dyn Clock>,
}

impl NotificationCentreService {
    /// Creates a new notification centre service.
    pub fn new(deliveries: Arc<dyn DeliveryStore>, clock: Arc<dyn Clock>) -> Self {
        Self { deliveries, clock }
    }

    /// The caller's delivered notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<DeliveryRecord>> {
        self.deliveries.list_for_user(ctx.user_id, page).await
    }

    /// How many of the caller's notifications are unread.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<u64> {
        self.deliveries.count_unread(ctx.user_id).await
    }

    /// Mark one of the caller's notifications as read.
    pub async fn mark_read(&self, ctx: &RequestContext, record_id: Uuid) -> AppResult<()> {
        let found = self
            .deliveries
            .mark_read(record_id, ctx.user_id, self.clock.now())
            .await?;
        if !found {
            return Err(AppError::not_found(format!(
                "Notification {record_id} not found"
            )));
        }
        Ok(())
    }
}
