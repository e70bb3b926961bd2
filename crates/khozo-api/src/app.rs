//! Application builder: wires stores, services, worker and router into a
//! running server.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware as axum_middleware;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;

use khozo_cache::CacheManager;
use khozo_core::config::{AppConfig, DatabaseConfig};
use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_core::traits::SystemClock;
use khozo_database::{DatabasePool, MemoryStore, Stores};
use khozo_worker::WorkerRunner;

use crate::middleware::compression::build_compression_layer;
use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server.cors);

    build_router(state)
        .layer(build_compression_layer())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(request_logging))
}

/// Open the configured store; PostgreSQL is migrated before use.
pub async fn open_stores(config: &DatabaseConfig) -> AppResult<Stores> {
    match config.provider.as_str() {
        "memory" => {
            tracing::warn!("Using the in-memory store; data is lost on restart");
            Ok(Stores::memory(Arc::new(MemoryStore::new())))
        }
        "postgres" => {
            tracing::info!("Connecting to database...");
            let pool = DatabasePool::connect(config).await?;

            tracing::info!("Running database migrations...");
            khozo_database::migration::run_migrations(pool.pool()).await?;
            tracing::info!("Database migrations complete");

            Ok(Stores::postgres(pool))
        }
        other => Err(AppError::configuration(format!(
            "Unknown database provider '{other}'; expected 'postgres' or 'memory'"
        ))),
    }
}

/// Build the application state for `config` on the system clock.
pub async fn build_state(config: AppConfig) -> AppResult<AppState> {
    // ── Step 1: Store ────────────────────────────────────────────
    let stores = open_stores(&config.database).await?;

    // ── Step 2: Cache ────────────────────────────────────────────
    tracing::info!(
        provider = %config.cache.provider,
        "Initializing cache..."
    );
    let cache = CacheManager::new(&config.cache)?;

    // ── Step 3: Push gateway ─────────────────────────────────────
    let gateway = khozo_push::build_gateway(&config.notification.push)?;

    // ── Step 4: Services ─────────────────────────────────────────
    tracing::info!("Initializing services...");
    AppState::build(config, stores, cache, gateway, Arc::new(SystemClock))
}

/// Runs the Sarkari Khozo server until Ctrl+C or SIGTERM.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Sarkari Khozo server...");

    let state = build_state(config.clone()).await?;

    // ── Step 5: Shutdown channel & worker ────────────────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let worker = WorkerRunner::new(
        Arc::clone(&state.notification_dispatcher),
        Arc::clone(&state.notification_scheduler),
        config.worker.clone(),
    );
    let worker_cancel = shutdown_rx.clone();
    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(worker_cancel).await {
            tracing::error!(error = %e, "Background worker stopped with an error");
        }
    });

    // ── Step 6: Build and start HTTP server ──────────────────────
    let stores = state.stores.clone();
    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, format!("Failed to bind {addr}"), e))?;

    tracing::info!("Sarkari Khozo listening on {}", addr);

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    server
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    // ── Step 7: Drain ────────────────────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    if tokio::time::timeout(grace, worker_handle).await.is_err() {
        tracing::warn!(
            grace_seconds = config.server.shutdown_grace_seconds,
            "Background worker did not stop in time"
        );
    }
    if let Some(pool) = stores.pool() {
        pool.close().await;
    }

    tracing::info!("Sarkari Khozo stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
