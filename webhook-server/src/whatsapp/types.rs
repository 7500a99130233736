//! WhatsApp Cloud API payload types.
//!
//! This module defines:
//! - Inbound webhook notifications, modelled as an optional chain. Arrays
//!   are kept as raw JSON and only their first element is decoded, and a
//!   field of the wrong type reads as absent, so noise elsewhere in the
//!   document never hides the first message.
//! - The outbound text message body and the send endpoint's response

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Deserialize a field, treating a value of the wrong type as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Decode the first element of a raw JSON array.
fn first_as<T: DeserializeOwned>(items: Option<&[Value]>) -> Option<T> {
    items
        .and_then(|items| items.first())
        .and_then(|first| T::deserialize(first).ok())
}

// =============================================================================
// Inbound Notification Types (POST /api/webhook)
// =============================================================================

/// Root webhook notification sent by the provider.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundNotification {
    /// Object type, normally "whatsapp_business_account"
    #[serde(default, deserialize_with = "lenient")]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub entry: Option<Vec<Value>>,
}

impl InboundNotification {
    /// First entry, if it is present and is an object.
    pub fn first_entry(&self) -> Option<Entry> {
        first_as(self.entry.as_deref())
    }

    pub fn entry_count(&self) -> usize {
        self.entry.as_ref().map(Vec::len).unwrap_or(0)
    }
}

/// One business account entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    /// Business account id
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub changes: Option<Vec<Value>>,
}

impl Entry {
    /// First change, if it is present and is an object.
    pub fn first_change(&self) -> Option<Change> {
        first_as(self.changes.as_deref())
    }
}

/// A single change notification.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    /// Subscribed field, e.g. "messages"
    #[serde(default, deserialize_with = "lenient")]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub value: Option<ChangeValue>,
}

/// Change body carrying messages or delivery statuses.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default, deserialize_with = "lenient")]
    pub messaging_product: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub metadata: Option<Metadata>,
    #[serde(default, deserialize_with = "lenient")]
    pub contacts: Option<Vec<Value>>,
    /// Raw `messages` value; absent, null or `[]` for status callbacks
    #[serde(default)]
    pub messages: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub statuses: Option<Vec<Value>>,
}

/// Shape of the `messages` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Messages<'a> {
    /// Absent, null or empty
    None,
    /// Non-empty array; only the first element is read
    First(&'a Value),
    /// Present but not an array
    Malformed,
}

impl ChangeValue {
    /// Classify the `messages` field.
    pub fn messages(&self) -> Messages<'_> {
        match &self.messages {
            None | Some(Value::Null) => Messages::None,
            Some(Value::Array(items)) => match items.first() {
                Some(first) => Messages::First(first),
                None => Messages::None,
            },
            Some(_) => Messages::Malformed,
        }
    }

    /// Number of delivery statuses carried by this change.
    pub fn status_count(&self) -> usize {
        self.statuses.as_ref().map(Vec::len).unwrap_or(0)
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.as_ref().map(Vec::len).unwrap_or(0)
    }

    /// Business phone number id the notification was addressed to.
    pub fn phone_number_id(&self) -> Option<&str> {
        self.metadata.as_ref()?.phone_number_id.as_deref()
    }
}

/// Business phone number metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Metadata {
    #[serde(default, deserialize_with = "lenient")]
    pub display_phone_number: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub phone_number_id: Option<String>,
}

/// A user-sent message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    /// Sender's WhatsApp id (phone number)
    #[serde(default, deserialize_with = "lenient")]
    pub from: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub timestamp: Option<String>,
    /// Message type (text, image, audio, ...)
    #[serde(default, rename = "type", deserialize_with = "lenient")]
    pub msg_type: Option<String>,
    /// Present for text messages only
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<TextBody>,
}

impl InboundMessage {
    /// Decode a raw message; anything that is not an object reads as empty.
    pub fn from_value(value: &Value) -> Self {
        Self::deserialize(value).unwrap_or_default()
    }
}

/// Text content of an inbound message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TextBody {
    #[serde(default, deserialize_with = "lenient")]
    pub body: Option<String>,
}

// =============================================================================
// Outbound Message Types (POST /{phone_id}/messages)
// =============================================================================

/// Text reply sent through the message-send endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundMessage {
    /// Always "whatsapp"
    pub messaging_product: String,
    /// Recipient's WhatsApp id
    pub to: String,
    pub text: OutboundText,
}

/// Text content of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundText {
    pub body: String,
}

impl OutboundMessage {
    /// Create a new text message for the given recipient.
    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            messaging_product: "whatsapp".to_string(),
            to: to.into(),
            text: OutboundText { body: body.into() },
        }
    }
}

/// Success body returned by the message-send endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendResponse {
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

/// Id assigned to an accepted outbound message.
#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

impl SendResponse {
    /// Id of the first accepted message, if the provider returned one.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}
