//! `ServiceKey` extractor guarding internal endpoints.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use khozo_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Header carrying the shared service key.
pub const SERVICE_KEY_HEADER: &str = "x-service-key";

/// Proof that the request presented the configured service key.
#[derive(Debug, Clone, Copy)]
pub struct ServiceKey;

impl FromRequestParts<AppState> for ServiceKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SERVICE_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing service key"))?;

        state.service_keys.verify(presented)?;
        Ok(ServiceKey)
    }
}
