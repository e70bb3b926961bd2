//! Route definitions for the Sarkari Khozo HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! The router receives `AppState` and passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::handlers;
use crate::state::AppState;

/// Build the `/api` route tree with state applied.
///
/// Middleware is layered on by [`crate::app::build_app`].
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(opportunity_routes())
        .merge(discovery_routes())
        .merge(history_routes())
        .merge(notification_routes())
        .merge(device_routes())
        .merge(internal_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Liveness, no auth
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Tracked opportunities and everything hanging off one
fn opportunity_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/opportunities",
            get(handlers::opportunity::list_opportunities)
                .post(handlers::opportunity::create_opportunity),
        )
        .route("/opportunities/{id}", get(handlers::opportunity::get_opportunity))
        .route(
            "/opportunities/{id}/transition",
            post(handlers::lifecycle::transition),
        )
        .route(
            "/opportunities/{id}/history",
            get(handlers::lifecycle::status_history),
        )
        .route(
            "/opportunities/{id}/preferences",
            get(handlers::notification::get_preferences)
                .put(handlers::notification::update_preferences),
        )
        .route(
            "/opportunities/{id}/schedule",
            post(handlers::notification::schedule),
        )
        .route(
            "/opportunities/{id}/notifications",
            get(handlers::notification::list_jobs),
        )
        .route("/opportunities/{id}/track", post(handlers::engagement::track))
        .route(
            "/opportunities/{id}/related",
            get(handlers::related::get_related),
        )
}

/// Trending lists
fn discovery_routes() -> Router<AppState> {
    Router::new()
        .route("/trending", get(handlers::trending::get_trending))
        .route("/trending/overview", get(handlers::trending::overview))
}

/// Viewing history
fn history_routes() -> Router<AppState> {
    Router::new().route(
        "/history",
        get(handlers::engagement::recent_views).delete(handlers::engagement::clear_history),
    )
}

/// Notification centre
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(handlers::notification::list_notifications))
        .route("/notifications/{id}/read", put(handlers::notification::mark_read))
}

/// Push token registry
fn device_routes() -> Router<AppState> {
    Router::new()
        .route("/devices", post(handlers::device::register_device))
        .route(
            "/devices/{token}",
            delete(handlers::device::unregister_device),
        )
}

/// Service-key endpoints
fn internal_routes() -> Router<AppState> {
    Router::new().route(
        "/internal/notifications/dispatch",
        post(handlers::internal::dispatch),
    )
}
