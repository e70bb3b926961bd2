//! HTTP client for an FCM-style push gateway.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use khozo_core::config::PushConfig;
use khozo_core::error::{AppError, ErrorKind};
use khozo_core::result::AppResult;
use khozo_core::traits::{PushDelivery, PushGateway, PushMessage};

/// Gateway error codes meaning the token will never work again.
const INVALID_TOKEN_ERRORS: &[&str] = &["NotRegistered", "InvalidRegistration", "UNREGISTERED"];

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    to: &'a str,
    notification: Notification<'a>,
    #[serde(skip_serializing_if = "is_null")]
    data: &'a serde_json::Value,
}

fn is_null(value: &&serde_json::Value) -> bool {
    value.is_null()
}

#[derive(Debug, Serialize)]
struct Notification<'a> {
    title: &'a str,
    body: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct SendResponse {
    #[serde(default)]
    results: Vec<SendResult>,
}

#[derive(Debug, Default, Deserialize)]
struct SendResult {
    #[serde(default)]
    error: Option<String>,
}

/// Posts `{to, notification, data}` to the configured endpoint.
#[derive(Debug, Clone)]
pub struct HttpPushGateway {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPushGateway {
    /// Build a client with the bearer key and timeout from configuration.
    pub fn new(config: &PushConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        if !config.server_key.is_empty() {
            let value = HeaderValue::from_str(&format!("key={}", config.server_key)).map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid push server key", e)
            })?;
            headers.insert(AUTHORIZATION, value);
        }
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build push client", e)
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PushGateway for HttpPushGateway {
    async fn send(&self, token: &str, message: &PushMessage) -> AppResult<PushDelivery> {
        let request = SendRequest {
            to: token,
            notification: Notification {
                title: &message.title,
                body: &message.body,
            },
            data: &message.data,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::ExternalService,
                    format!("Push gateway request failed: {e}"),
                    e,
                )
            })?;

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(status = %status, error = %e, "Failed to read push gateway response");
                return Ok(unreadable_response(status, &e));
            }
        };
        debug!(status = %status, "Push gateway responded");

        Ok(interpret_response(status, &body))
    }

    fn name(&self) -> &str {
        "http"
    }
}

/// Outcome when the response body could not be read.
///
/// Delivery cannot be confirmed, so the send counts as rejected. The token
/// is only marked invalid when the status alone says so.
fn unreadable_response(status: StatusCode, error: &dyn std::fmt::Display) -> PushDelivery {
    PushDelivery::Rejected {
        reason: format!("gateway returned {status} with an unreadable body: {error}"),
        token_invalid: matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE),
    }
}

/// Map a gateway response to a delivery outcome.
fn interpret_response(status: StatusCode, body: &str) -> PushDelivery {
    if !status.is_success() {
        return PushDelivery::Rejected {
            reason: format!("gateway returned {status}: {}", body.trim()),
            token_invalid: matches!(status, StatusCode::NOT_FOUND | StatusCode::GONE),
        };
    }

    let parsed: SendResponse = serde_json::from_str(body).unwrap_or_default();
    match parsed.results.into_iter().find_map(|r| r.error) {
        Some(error) => PushDelivery::Rejected {
            token_invalid: INVALID_TOKEN_ERRORS.contains(&error.as_str()),
            reason: error,
        },
        None => PushDelivery::Delivered,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_without_errors_is_delivered() {
        let outcome = interpret_response(StatusCode::OK, r#"{"success":1,"results":[{}]}"#);
        assert!(outcome.is_delivered());
        assert!(interpret_response(StatusCode::OK, "").is_delivered());
    }

    #[test]
    fn test_not_registered_marks_token_invalid() {
        let outcome = interpret_response(
            StatusCode::OK,
            r#"{"failure":1,"results":[{"error":"NotRegistered"}]}"#,
        );
        assert_eq!(
            outcome,
            PushDelivery::Rejected {
                reason: "NotRegistered".into(),
                token_invalid: true
            }
        );
    }

    #[test]
    fn test_server_error_is_rejected_with_message() {
        match interpret_response(StatusCode::SERVICE_UNAVAILABLE, "try later\n") {
            PushDelivery::Rejected {
                reason,
                token_invalid,
            } => {
                assert_eq!(reason, "gateway returned 503 Service Unavailable: try later");
                assert!(!token_invalid);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_unreadable_success_body_is_not_delivered() {
        match unreadable_response(StatusCode::OK, &"connection reset") {
            PushDelivery::Rejected {
                reason,
                token_invalid,
            } => {
                assert_eq!(
                    reason,
                    "gateway returned 200 OK with an unreadable body: connection reset"
                );
                assert!(!token_invalid);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }

        match unreadable_response(StatusCode::NOT_FOUND, &"eof") {
            PushDelivery::Rejected { token_invalid, .. } => assert!(token_invalid),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_gone_marks_token_invalid() {
        match interpret_response(StatusCode::GONE, "") {
            PushDelivery::Rejected { token_invalid, .. } => assert!(token_invalid),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_request_body_shape() {
        let data = serde_json::json!({"opportunityId": "x"});
        let request = SendRequest {
            to: "tok",
            notification: Notification {
                title: "T",
                body: "B",
            },
            data: &data,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["to"], "tok");
        assert_eq!(json["notification"]["title"], "T");
        assert_eq!(json["data"]["opportunityId"], "x");
    }

    #[test]
    fn test_new_builds_client() {
        let gateway = HttpPushGateway::new(&PushConfig {
            enabled: true,
            server_key: "abc".into(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(gateway.name(), "http");
    }
}
