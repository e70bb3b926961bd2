//! Trending handlers.

use axum::Json;
use axum::extract::{Query, State};

use khozo_service::{TrendingItem, TrendingOverview};

use crate::dto::request::{TrendingParams, validated};
use crate::dto::response::ApiResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/trending
pub async fn get_trending(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<TrendingParams>,
) -> ApiResult<Json<ApiResponse<Vec<TrendingItem>>>> {
    let params = validated(params)?;
    let items = state
        .trending_service
        .get_trending(&auth, params.time_window()?, params.limit)
        .await?;
    Ok(Json(ApiResponse::ok(items)))
}

/// GET /api/trending/overview
pub async fn overview(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ApiResponse<TrendingOverview>>> {
    let overview = state.trending_service.overview(&auth).await?;
    Ok(Json(ApiResponse::ok(overview)))
}
