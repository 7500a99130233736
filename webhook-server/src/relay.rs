//! Inbound notification relay.
//!
//! Turns one webhook notification into at most one outbound reply.
//!
//! ## Processing Flow
//!
//! ```text
//! body → InboundNotification → extract_message() → classify() → WhatsAppClient::send_text()
//! ```
//!
//! Every failure is returned as a [`RelayError`]; the web layer logs it and
//! still acknowledges the webhook.

use thiserror::Error;
use tracing::info;

use crate::reply::{classify, Reply};
use crate::whatsapp::{
    InboundMessage, InboundNotification, Messages, SendError, WhatsAppClient,
};

/// Why a notification could not be answered.
#[derive(Debug, Error)]
pub enum RelayError {
    #[error("body is not a valid notification: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("notification has no entry")]
    MissingEntry,

    #[error("entry has no changes")]
    MissingChange,

    #[error("change has no value")]
    MissingValue,

    #[error("messages is not an array")]
    MalformedMessages,

    #[error("message has no sender")]
    MissingSender,

    #[error("message has no text body")]
    MissingText,

    #[error("reply delivery failed: {0}")]
    Send(#[from] SendError),
}

/// Sender and text of the first message in a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingText {
    pub from: String,
    pub body: String,
}

/// Successful relay result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    /// A reply was delivered to the sender.
    Replied { to: String, reply: Reply },
    /// The notification carried no messages (e.g. a delivery status).
    NoMessages,
}

/// Parse a raw webhook body.
pub fn parse_notification(body: &[u8]) -> Result<InboundNotification, RelayError> {
    Ok(serde_json::from_slice(body)?)
}

/// Extract the first message of the first change of the first entry.
///
/// Returns `Ok(None)` when the change carries no messages. Later entries,
/// changes and messages are never decoded.
pub fn extract_message(
    notification: &InboundNotification,
) -> Result<Option<IncomingText>, RelayError> {
    let entry = notification.first_entry().ok_or(RelayError::MissingEntry)?;
    let change = entry.first_change().ok_or(RelayError::MissingChange)?;
    let value = change.value.as_ref().ok_or(RelayError::MissingValue)?;

    let raw = match value.messages() {
        Messages::First(raw) => raw,
        Messages::None => {
            info!(
                entry_id = entry.id.as_deref().unwrap_or("unknown"),
                field = change.field.as_deref().unwrap_or("unknown"),
                messaging_product = value.messaging_product.as_deref().unwrap_or("unknown"),
                status_count = value.status_count(),
                "webhook_no_messages"
            );
            return Ok(None);
        }
        Messages::Malformed => return Err(RelayError::MalformedMessages),
    };

    let message = InboundMessage::from_value(raw);

    info!(
        entry_id = entry.id.as_deref().unwrap_or("unknown"),
        phone_number_id = value.phone_number_id().unwrap_or("unknown"),
        display_phone_number = value
            .metadata
            .as_ref()
            .and_then(|m| m.display_phone_number.as_deref())
            .unwrap_or("unknown"),
        contact_count = value.contact_count(),
        message_id = message.id.as_deref().unwrap_or("unknown"),
        message_type = message.msg_type.as_deref().unwrap_or("unknown"),
        message_timestamp = message.timestamp.as_deref().unwrap_or("unknown"),
        "webhook_message_found"
    );

    let from = message.from.ok_or(RelayError::MissingSender)?;
    let body = message
        .text
        .and_then(|t| t.body)
        .ok_or(RelayError::MissingText)?;

    Ok(Some(IncomingText { from, body }))
}

/// Answer one notification: extract, classify and dispatch.
pub async fn relay(
    client: &WhatsAppClient,
    notification: &InboundNotification,
) -> Result<RelayOutcome, RelayError> {
    let incoming = match extract_message(notification)? {
        Some(incoming) => incoming,
        None => return Ok(RelayOutcome::NoMessages),
    };

    let reply = classify(&incoming.body);

    info!(
        from = %incoming.from,
        body_length = incoming.body.len(),
        reply = reply.label(),
        "message_classified"
    );

    client.send_text(&incoming.from, reply.text()).await?;

    Ok(RelayOutcome::Replied {
        to: incoming.from,
        reply,
    })
}

/// Parse and answer a raw webhook body.
pub async fn relay_body(client: &WhatsAppClient, body: &[u8]) -> Result<RelayOutcome, RelayError> {
    let notification = parse_notification(body)?;

    info!(
        object = notification.object.as_deref().unwrap_or("unknown"),
        entry_count = notification.entry_count(),
        "webhook_parsed"
    );

    relay(client, &notification).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Config;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn notification(value: serde_json::Value) -> InboundNotification {
        serde_json::from_value(json!({
            "object": "whatsapp_business_account",
            "entry": [{ "id": "1", "changes": [{ "field": "messages", "value": value }] }]
        }))
        .unwrap()
    }

    fn text_message(from: &str, body: &str) -> InboundNotification {
        notification(json!({
            "messaging_product": "whatsapp",
            "messages": [{ "from": from, "id": "wamid.in", "type": "text", "text": { "body": body } }]
        }))
    }

    fn client_for(server: &MockServer) -> WhatsAppClient {
        WhatsAppClient::new(&Config {
            meta_token: Some("token".to_string()),
            phone_id: Some("555".to_string()),
            graph_api_base_url: server.uri(),
            ..Config::default()
        })
    }

    #[test]
    fn test_extract_text_message() {
        let incoming = extract_message(&text_message("16505551234", "Hola"))
            .unwrap()
            .unwrap();
        assert_eq!(
            incoming,
            IncomingText {
                from: "16505551234".to_string(),
                body: "Hola".to_string(),
            }
        );
    }

    #[test]
    fn test_extract_absent_or_empty_messages() {
        let status = notification(json!({ "statuses": [{ "status": "read" }] }));
        assert_eq!(extract_message(&status).unwrap(), None);

        let empty = notification(json!({ "messages": [] }));
        assert_eq!(extract_message(&empty).unwrap(), None);
    }

    #[test]
    fn test_extract_missing_levels() {
        let no_entry = parse_notification(br#"{"object":"x"}"#).unwrap();
        assert!(matches!(extract_message(&no_entry), Err(RelayError::MissingEntry)));

        let empty_entry = parse_notification(br#"{"entry":[]}"#).unwrap();
        assert!(matches!(extract_message(&empty_entry), Err(RelayError::MissingEntry)));

        let no_changes = parse_notification(br#"{"entry":[{"id":"1"}]}"#).unwrap();
        assert!(matches!(extract_message(&no_changes), Err(RelayError::MissingChange)));

        let no_value = parse_notification(br#"{"entry":[{"changes":[{"field":"messages"}]}]}"#)
            .unwrap();
        assert!(matches!(extract_message(&no_value), Err(RelayError::MissingValue)));
    }

    #[test]
    fn test_extract_missing_sender_or_text() {
        let no_from = notification(json!({ "messages": [{ "text": { "body": "hola" } }] }));
        assert!(matches!(extract_message(&no_from), Err(RelayError::MissingSender)));

        let image = notification(json!({
            "messages": [{ "from": "1", "type": "image", "image": { "id": "media" } }]
        }));
        assert!(matches!(extract_message(&image), Err(RelayError::MissingText)));
    }

    #[test]
    fn test_parse_invalid_json() {
        assert!(matches!(
            parse_notification(b"not json"),
            Err(RelayError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_notification(b""),
            Err(RelayError::InvalidJson(_))
        ));

        let wrong_type = parse_notification(br#"{"entry":"oops"}"#).unwrap();
        assert!(matches!(extract_message(&wrong_type), Err(RelayError::MissingEntry)));
    }

    #[test]
    fn test_extract_ignores_later_elements() {
        let parsed = parse_notification(
            br#"{"entry":[{"changes":[{"value":{"messages":[
                {"from":"111","text":{"body":"hola"}},
                {"from":5}
            ]}}, "garbage"]}, "garbage"]}"#,
        )
        .unwrap();

        let incoming = extract_message(&parsed).unwrap().unwrap();
        assert_eq!(incoming.from, "111");
        assert_eq!(incoming.body, "hola");
    }

    #[test]
    fn test_extract_ignores_wrong_typed_side_fields() {
        let parsed = notification(json!({
            "messaging_product": 1,
            "metadata": "x",
            "contacts": "x",
            "messages": [{ "from": "111", "timestamp": 17, "text": { "body": "hola" } }]
        }));
        let incoming = extract_message(&parsed).unwrap().unwrap();
        assert_eq!(incoming.from, "111");

        let status = notification(json!({ "statuses": { "a": 1 } }));
        assert_eq!(extract_message(&status).unwrap(), None);
    }

    #[test]
    fn test_extract_malformed_messages() {
        let parsed = notification(json!({ "messages": { "from": "111" } }));
        assert!(matches!(
            extract_message(&parsed),
            Err(RelayError::MalformedMessages)
        ));

        let not_object = notification(json!({ "messages": ["hola"] }));
        assert!(matches!(extract_message(&not_object), Err(RelayError::MissingSender)));
    }

    #[tokio::test]
    async fn test_relay_sends_classified_reply() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v19.0/555/messages"))
            .and(body_partial_json(json!({
                "to": "16505551234",
                "text": { "body": Reply::Portfolio.text() }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "messages": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let outcome = relay(
            &client_for(&server),
            &text_message("16505551234", "cuéntame del portafolio"),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome,
            RelayOutcome::Replied {
                to: "16505551234".to_string(),
                reply: Reply::Portfolio,
            }
        );
    }

    #[tokio::test]
    async fn test_relay_no_messages_makes_no_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let outcome = relay(&client_for(&server), &notification(json!({ "messages": [] })))
            .await
            .unwrap();

        assert_eq!(outcome, RelayOutcome::NoMessages);
    }

    #[tokio::test]
    async fn test_relay_surfaces_send_failure() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let err = relay(&client_for(&server), &text_message("1", "hola"))
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::Send(SendError::Status { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_relay_body_missing_entry_makes_no_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let err = relay_body(&client_for(&server), br#"{"object":"whatsapp_business_account"}"#)
            .await
            .unwrap_err();

        assert!(matches!(err, RelayError::MissingEntry));
    }
}
