//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Bearer-credential verification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret used to verify HS256 access tokens issued by the
    /// identity provider.
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    /// Expected `aud` claim. Empty disables the audience check.
    #[serde(default = "default_audience")]
    pub audience: String,
    /// Access token TTL in minutes (used when this service mints tokens).
    #[serde(default = "default_access_ttl")]
    pub access_ttl_minutes: u64,
    /// Key required in the `x-service-key` header on internal endpoints.
    #[serde(default = "default_service_key")]
    pub service_key: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            audience: default_audience(),
            access_ttl_minutes: default_access_ttl(),
            service_key: default_service_key(),
        }
    }
}

fn default_jwt_secret() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}

fn default_audience() -> String {
    "authenticated".to_string()
}

fn default_access_ttl() -> u64 {
    60
}

fn default_service_key() -> String {
    "CHANGE_ME_IN_PRODUCTION".to_string()
}
