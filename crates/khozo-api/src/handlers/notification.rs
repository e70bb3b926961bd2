//! Reminder preference, scheduling and notification centre handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use khozo_entity::notification::NotificationJob;
use khozo_entity::opportunity::NotificationPreferences;
use khozo_service::ScheduleOutcome;

use crate::dto::response::{
    ApiResponse, MessageResponse, NotificationListResponse, PreferencesResponse,
};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, JsonBody, PaginationParams};
use crate::state::AppState;

/// GET /api/opportunities/{id}/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<NotificationPreferences>>> {
    let preferences = state.notification_scheduler.get_preferences(&auth, id).await?;
    Ok(Json(ApiResponse::ok(preferences)))
}

/// PUT /api/opportunities/{id}/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    JsonBody(preferences): JsonBody<NotificationPreferences>,
) -> ApiResult<Json<ApiResponse<PreferencesResponse>>> {
    let (preferences, schedule) = state
        .notification_scheduler
        .update_preferences(&auth, id, preferences)
        .await?;
    Ok(Json(ApiResponse::ok(PreferencesResponse {
        preferences,
        schedule,
    })))
}

/// POST /api/opportunities/{id}/schedule
pub async fn schedule(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<ScheduleOutcome>>> {
    let outcome = state.notification_scheduler.schedule_for(&auth, id).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/opportunities/{id}/notifications
pub async fn list_jobs(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<NotificationJob>>>> {
    let jobs = state.notification_scheduler.list_jobs(&auth, id).await?;
    Ok(Json(ApiResponse::ok(jobs)))
}

/// GET /api/notifications
pub async fn list_notifications(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<NotificationListResponse>>> {
    let page_request = params.into_page_request();
    let (page, unread_count) = tokio::join!(
        state.notification_centre.list(&auth, &page_request),
        state.notification_centre.unread_count(&auth)
    );
    Ok(Json(ApiResponse::ok(NotificationListResponse {
        page: page?,
        unread_count: unread_count?,
    })))
}

/// PUT /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.notification_centre.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Marked as read"))))
}
