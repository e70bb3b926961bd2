//! Opportunity tracking handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use uuid::Uuid;

use khozo_core::types::PageResponse;
use khozo_entity::opportunity::Opportunity;

use crate::dto::request::CreateOpportunityRequest;
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::{AuthUser, PaginationParams, ValidJson};
use crate::state::AppState;

/// POST /api/opportunities
pub async fn create_opportunity(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateOpportunityRequest>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Opportunity>>)> {
    let opportunity = state
        .opportunity_service
        .create(&auth, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(opportunity))))
}

/// GET /api/opportunities
pub async fn list_opportunities(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> ApiResult<Json<ApiResponse<PageResponse<Opportunity>>>> {
    let page = state
        .opportunity_service
        .list(&auth, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/opportunities/{id}
pub async fn get_opportunity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApiResponse<Opportunity>>> {
    let opportunity = state.opportunity_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(opportunity)))
}
