//! Internal endpoints called by schedulers, guarded by the service key.

use axum::Json;
use axum::extract::{Query, State};

use khozo_service::DispatchSummary;

use crate::dto::request::DispatchParams;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::ServiceKey;
use crate::state::AppState;

/// POST /api/internal/notifications/dispatch
pub async fn dispatch(
    State(state): State<AppState>,
    _key: ServiceKey,
    Query(params): Query<DispatchParams>,
) -> ApiResult<Json<ApiResponse<DispatchSummary>>> {
    let summary = state
        .notification_dispatcher
        .dispatch_batch(params.limit)
        .await?;
    tracing::info!(
        sent = summary.sent,
        failed = summary.failed,
        "Dispatch batch triggered over HTTP"
    );
    Ok(Json(ApiResponse::ok(summary)))
}
