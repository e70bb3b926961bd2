//! Gateway that only logs.

use async_trait::async_trait;
use tracing::info;

use khozo_core::result::AppResult;
use khozo_core::traits::{PushDelivery, PushGateway, PushMessage};

/// Logs every message and reports it as delivered.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPushGateway;

#[async_trait]
impl PushGateway for LogPushGateway {
    async fn send(&self, token: &str, message: &PushMessage) -> AppResult<PushDelivery> {
        let suffix = token
            .char_indices()
            .rev()
            .nth(5)
            .map_or(token, |(idx, _)| &token[idx..]);
        info!(token_suffix = %suffix, title = %message.title, "Push (log only)");
        Ok(PushDelivery::Delivered)
    }

    fn name(&self) -> &str {
        "log"
    }
}
