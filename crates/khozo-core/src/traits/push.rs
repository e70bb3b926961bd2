//! Push gateway trait for delivering notifications to devices.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::result::AppResult;

/// Title/body payload handed to the gateway.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PushMessage {
    /// Notification title.
    pub title: String,
    /// Notification body.
    pub body: String,
    /// Extra key/value data delivered alongside the notification.
    #[serde(default)]
    pub data: serde_json::Value,
}

/// Outcome reported by the gateway for a single token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushDelivery {
    /// The gateway accepted the message.
    Delivered,
    /// The gateway answered with a non-success response.
    Rejected {
        /// Error message reported by the gateway.
        reason: String,
        /// The token is no longer registered and should be deactivated.
        token_invalid: bool,
    },
}

impl PushDelivery {
    /// Whether the message was accepted.
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// A push notification gateway (FCM, Web Push relay, ...).
///
/// `Err` is reserved for transport failures (connection refused, timeout);
/// a gateway that answers with an error status yields
/// [`PushDelivery::Rejected`].
#[async_trait]
pub trait PushGateway: Send + Sync + std::fmt::Debug + 'static {
    /// Deliver `message` to the device identified by `token`.
    async fn send(&self, token: &str, message: &PushMessage) -> AppResult<PushDelivery>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}
