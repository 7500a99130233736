//! Webhook endpoint handlers.
//!
//! The POST handler always answers 200: the provider retries any other
//! status, and a retried notification would be answered twice.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::relay::{relay_body, RelayOutcome};
use crate::web::verify::{verify_subscription, VerifyQuery};
use crate::whatsapp::WhatsAppClient;
use crate::Config;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: WhatsAppClient,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let client = WhatsAppClient::new(&config);
        Self {
            config: Arc::new(config),
            client,
        }
    }
}

// =============================================================================
// Liveness
// =============================================================================

/// Liveness response.
#[derive(Serialize)]
pub struct HomeResponse {
    pub status: &'static str,
    pub message: &'static str,
}

/// Liveness endpoint.
pub async fn home() -> Json<HomeResponse> {
    Json(HomeResponse {
        status: "ok",
        message: "🚀 Servidor WhatsApp activo y escuchando /api/webhook",
    })
}

// =============================================================================
// Verification Handshake
// =============================================================================

/// Verification failure body.
#[derive(Serialize)]
pub struct VerifyErrorResponse {
    pub error: &'static str,
}

/// Webhook verification endpoint.
///
/// Echoes `hub.challenge` as plain text on success, 403 otherwise.
pub async fn verify_webhook(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Response {
    match verify_subscription(&query, state.config.verify_token.as_deref()) {
        Ok(challenge) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            challenge.to_string(),
        )
            .into_response(),
        Err(_) => (
            StatusCode::FORBIDDEN,
            Json(VerifyErrorResponse {
                error: "Verificación fallida",
            }),
        )
            .into_response(),
    }
}

// =============================================================================
// Inbound Messages
// =============================================================================

/// Webhook acknowledgment.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub status: &'static str,
}

/// Inbound notification endpoint.
///
/// Reads the raw body itself, up to `max_body_bytes`, so that bodies of any
/// shape or size are acknowledged instead of rejected by an extractor.
pub async fn receive_webhook(State(state): State<AppState>, body: Body) -> impl IntoResponse {
    let limit = state.config.max_body_bytes;
    let body = match to_bytes(body, limit).await {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, max_body_bytes = limit, "webhook_body_unreadable");
            return (StatusCode::OK, Json(WebhookResponse { status: "ok" }));
        }
    };

    info!(body_length = body.len(), "webhook_received");

    let status = match relay_body(&state.client, &body).await {
        Ok(RelayOutcome::Replied { to, reply }) => {
            info!(to = %to, reply = reply.label(), "webhook_replied");
            "ok"
        }
        Ok(RelayOutcome::NoMessages) => "no_messages",
        Err(e) => {
            warn!(error = %e, "webhook_relay_failed");
            "ok"
        }
    };

    (StatusCode::OK, Json(WebhookResponse { status }))
}
