//! Graph API client for sending WhatsApp replies.
//!
//! The client is cheap to clone and shared across request handlers. Every
//! send is a single attempt bounded by the configured timeout.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

use super::types::{OutboundMessage, SendResponse};
use crate::Config;

/// Outbound delivery failure.
#[derive(Debug, Error)]
pub enum SendError {
    /// A required credential was not configured.
    #[error("{0} is not configured")]
    MissingCredential(&'static str),

    /// The request did not complete within the timeout.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The request could not be sent or its response could not be read.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// WhatsApp Cloud API client.
#[derive(Clone)]
pub struct WhatsAppClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: Client,
    endpoint: Option<String>,
    auth_token: Option<String>,
    timeout: Duration,
}

impl WhatsAppClient {
    /// Create a client from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                http: Client::new(),
                endpoint: config.messages_endpoint(),
                auth_token: config.meta_token.clone(),
                timeout: Duration::from_millis(config.request_timeout_ms),
            }),
        }
    }

    /// Send a text message to `to`.
    pub async fn send_text(&self, to: &str, body: &str) -> Result<SendResponse, SendError> {
        self.send(&OutboundMessage::text(to, body)).await
    }

    /// Send one outbound message. No retries.
    pub async fn send(&self, message: &OutboundMessage) -> Result<SendResponse, SendError> {
        let endpoint = self
            .inner
            .endpoint
            .as_deref()
            .ok_or(SendError::MissingCredential("PHONE_ID"))?;
        let token = self
            .inner
            .auth_token
            .as_deref()
            .ok_or(SendError::MissingCredential("META_TOKEN"))?;
        let timeout = self.inner.timeout;

        info!(
            to = %message.to,
            body_length = message.text.body.len(),
            timeout_seconds = timeout.as_secs_f64(),
            "whatsapp_send_starting"
        );

        let response = self
            .inner
            .http
            .post(endpoint)
            .bearer_auth(token)
            .timeout(timeout)
            .json(message)
            .send()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| classify_transport_error(e, timeout))?;

        info!(
            to = %message.to,
            status_code = status.as_u16(),
            response_body = %body,
            "whatsapp_send_response"
        );

        if !status.is_success() {
            return Err(SendError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // A 2xx with an unexpected body still counts as delivered.
        let parsed: SendResponse = serde_json::from_str(&body).unwrap_or_default();

        info!(
            to = %message.to,
            message_id = parsed.message_id().unwrap_or("unknown"),
            "whatsapp_send_complete"
        );

        Ok(parsed)
    }
}

fn classify_transport_error(e: reqwest::Error, timeout: Duration) -> SendError {
    if e.is_timeout() {
        error!(
            timeout_seconds = timeout.as_secs_f64(),
            error = %e,
            "whatsapp_send_timeout"
        );
        SendError::Timeout(timeout)
    } else {
        error!(error = %e, "whatsapp_send_request_error");
        SendError::Transport(e)
    }
}
