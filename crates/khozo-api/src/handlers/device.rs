//! Push token registration handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use khozo_entity::notification::DeviceToken;

use crate::dto::request::RegisterDeviceRequest;
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::{AuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/devices
pub async fn register_device(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<RegisterDeviceRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<DeviceToken>>)> {
    let device = state
        .device_service
        .register(&auth, &req.token, req.platform.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(device))))
}

/// DELETE /api/devices/{token}
pub async fn unregister_device(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(token): Path<String>,
) -> ApiResult<Json<ApiResponse<MessageResponse>>> {
    state.device_service.unregister(&auth, &token).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Device removed"))))
}
