//! Status transition handlers.

use axum::Json;
use axum::extract::{Path, State};
use uuid::Uuid;

use khozo_entity::history::StatusHistoryEntry;
use khozo_service::TransitionOutcome;

use crate::dto::request::TransitionRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/opportunities/{id}/transition
pub async fn transition(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<TransitionRequest>,
) -> ApiResult<Json<ApiResponse<TransitionOutcome>>> {
    let outcome = state
        .lifecycle_service
        .transition(&auth, id, &req.status, req.reason)
        .await?;
    Ok(Json(ApiResponse::ok(outcome)))
}

/// GET /api/opportunities/{id}/history
pub async fn status_history(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Vec<StatusHistoryEntry>>>> {
    let entries = state.lifecycle_service.history(&auth, id).await?;
    Ok(Json(ApiResponse::ok(entries)))
}
