//! # khozo-push
//!
//! Implementations of [`PushGateway`]: an HTTP client for an FCM-style
//! gateway and a logging gateway used when push delivery is disabled.

pub mod http;
pub mod log;

use std::sync::Arc;

use tracing::info;

use khozo_core::config::PushConfig;
use khozo_core::result::AppResult;
use khozo_core::traits::PushGateway;

pub use http::HttpPushGateway;
pub use log::LogPushGateway;

/// Build the gateway selected by configuration.
pub fn build_gateway(config: &PushConfig) -> AppResult<Arc<dyn PushGateway>> {
    if config.enabled {
        info!(endpoint = %config.endpoint, "Push delivery enabled");
        Ok(Arc::new(HttpPushGateway::new(config)?))
    } else {
        info!("Push delivery disabled, using log gateway");
        Ok(Arc::new(LogPushGateway))
    }
}
