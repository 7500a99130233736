//! Web server module for the WhatsApp webhook.
//!
//! Routes:
//! - `GET /` liveness
//! - `GET /api/webhook` subscription handshake
//! - `POST /api/webhook` inbound notifications

pub mod handlers;
pub mod verify;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

pub use handlers::{
    home, receive_webhook, verify_webhook, AppState, HomeResponse, VerifyErrorResponse,
    WebhookResponse,
};
pub use verify::{verify_subscription, VerifyError, VerifyQuery};

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/api/webhook", get(verify_webhook).post(receive_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
