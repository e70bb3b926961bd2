//! Related content handler.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;

use khozo_service::RelatedItem;

use crate::dto::request::{RelatedParams, validated};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/opportunities/{id}/related
pub async fn get_related(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<RelatedParams>,
) -> ApiResult<Json<ApiResponse<Vec<RelatedItem>>>> {
    let query = validated(params)?.into_query(id)?;
    let items = state.related_service.get_related(&auth, query).await?;
    Ok(Json(ApiResponse::ok(items)))
}
