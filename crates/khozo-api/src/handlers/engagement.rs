//! Engagement tracking and viewing history handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use khozo_entity::history::ViewingHistoryEntry;

use crate::dto::request::{HistoryParams, TrackRequest};
use crate::dto::response::{ApiResponse, RemovedResponse, TrackResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/opportunities/{id}/track
pub async fn track(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<TrackRequest>,
) -> ApiResult<Json<ApiResponse<TrackResponse>>> {
    let kind = state.engagement_service.track(&auth, id, &req.kind).await?;
    Ok(Json(ApiResponse::ok(TrackResponse { kind })))
}

/// GET /api/history
pub async fn recent_views(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<HistoryParams>,
) -> ApiResult<Json<ApiResponse<Vec<ViewingHistoryEntry>>>> {
    let entries = state
        .engagement_service
        .recent_views(&auth, params.limit)
        .await?;
    Ok(Json(ApiResponse::ok(entries)))
}

/// DELETE /api/history
pub async fn clear_history(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<RemovedResponse>>> {
    let removed = state.engagement_service.clear_history(&auth).await?;
    Ok(Json(ApiResponse::ok(RemovedResponse { removed })))
}
