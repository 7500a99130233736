//! WhatsApp Cloud API module.
//!
//! This module provides:
//! - Typed inbound webhook notifications and outbound message bodies
//! - An async client for the Graph API message-send endpoint
//!
//! ## Flow
//!
//! ```text
//! Provider → POST /api/webhook → relay → WhatsAppClient → Graph API → end user
//! ```

pub mod client;
pub mod types;

pub use client::{SendError, WhatsAppClient};
pub use types::{
    Change, ChangeValue, Entry, InboundMessage, InboundNotification, Messages,
    OutboundMessage, SendResponse, TextBody,
};
