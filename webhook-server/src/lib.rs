//! wabot - WhatsApp Cloud API keyword auto-responder.
//!
//! This library provides the pieces behind the `wa-autoresponder` binary:
//! - `web`: axum routes for the handshake and inbound notifications
//! - `relay`: extraction and dispatch of one reply per notification
//! - `reply`: keyword classification into canned replies
//! - `whatsapp`: payload types and the Graph API client
//!
//! ## Architecture
//!
//! ```text
//! Provider → Web Server → relay → classify → WhatsAppClient → Provider
//! ```

pub mod config;
pub mod relay;
pub mod reply;
pub mod web;
pub mod whatsapp;

// Re-export commonly used types
pub use config::Config;
pub use relay::{relay, relay_body, RelayError, RelayOutcome};
pub use reply::{classify, Reply};
pub use web::{router, AppState};
pub use whatsapp::{InboundNotification, OutboundMessage, SendError, WhatsAppClient};
