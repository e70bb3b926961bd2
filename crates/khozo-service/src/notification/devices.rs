//! Push device token registration.

use std::sync::Arc;

use tracing::info;

use khozo_core::AppError;
use khozo_core::result::AppResult;
use khozo_core::traits::Clock;
use khozo_database::store::DeviceTokenStore;
use khozo_entity::notification::DeviceToken;

use crate::context::RequestContext;

/// Longest accepted device token.
const MAX_TOKEN_LEN: usize = 4096;

/// Registers and removes the caller's push tokens.
#[derive(Debug, Clone)]
pub struct DeviceService {
    devices: Arc<dyn DeviceTokenStore>,
    clock: Arc<dyn Clock>,
}

impl DeviceService {
    /// Creates a new device service.
    pub fn new(devices: Arc<dyn DeviceTokenStore>, clock: Arc<dyn Clock>) -> Self {
        Self { devices, clock }
    }

    /// Register a token for the caller. Re-registering re-activates it.
    pub async fn register(
        &self,
        ctx: &RequestContext,
        token: &str,
        platform: Option<&str>,
    ) -> AppResult<DeviceToken> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AppError::validation("Device token must not be empty"));
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(AppError::validation("Device token is too long"));
        }

        let device = self
            .devices
            .register(ctx.user_id, token, platform, self.clock.now())
            .await?;
        info!(user_id = %ctx.user_id, device_id = %device.id, "Device token registered");
        Ok(device)
    }

    /// Remove one of the caller's tokens.
    pub async fn unregister(&self, ctx: &RequestContext, token: &str) -> AppResult<()> {
        if !self.devices.unregister(ctx.user_id, token.trim()).await? {
            return Err(AppError::not_found("Device token not registered"));
        }
        info!(user_id = %ctx.user_id, "Device token removed");
        Ok(())
    }
}
