//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section; every section has defaults so a bare environment still boots.

pub mod app;
pub mod auth;
pub mod cache;
pub mod database;
pub mod lifecycle;
pub mod logging;
pub mod notification;
pub mod ranking;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::cache::CacheConfig;
pub use self::database::DatabaseConfig;
pub use self::lifecycle::LifecycleConfig;
pub use self::logging::LoggingConfig;
pub use self::notification::{NotificationConfig, PushConfig};
pub use self::ranking::{RelatedConfig, TrendingConfig};
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Cache provider settings.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Status transition settings.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    /// Reminder scheduling and push delivery settings.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Related-content settings.
    #[serde(default)]
    pub related: RelatedConfig,
    /// Trending settings.
    #[serde(default)]
    pub trending: TrendingConfig,
    /// Background worker settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `KHOZO__`
    /// (e.g. `KHOZO__DATABASE__URL`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("KHOZO")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject settings that would only fail later at runtime.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.database.provider == "postgres" && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required when database.provider = \"postgres\"",
            ));
        }
        if self.notification.reminder_hour_utc > 23 || self.notification.reminder_minute_utc > 59 {
            return Err(AppError::configuration(
                "notification.reminder_hour_utc/minute_utc out of range",
            ));
        }
        if !(0.0..=1.0).contains(&self.related.default_min_similarity) {
            return Err(AppError::configuration(
                "related.default_min_similarity must be within [0, 1]",
            ));
        }
        Ok(())
    }
}
