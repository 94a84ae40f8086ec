//! Relay wire format.
//!
//! Every frame is a JSON array whose first element names the message type.

use serde_json::{json, Value};

use super::error::RelayError;
use super::event::{Event, Filter};

/// Frames sent from the client to the relay.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    /// Open a subscription: `["REQ", <id>, <filter>...]`.
    Req {
        subscription_id: String,
        filters: Vec<Filter>,
    },
    /// Cancel a subscription: `["CLOSE", <id>]`.
    Close { subscription_id: String },
}

impl ClientMessage {
    /// Serialize to a JSON text frame.
    pub fn to_json(&self) -> Result<String, RelayError> {
        let frame = match self {
            ClientMessage::Req {
                subscription_id,
                filters,
            } => {
                let mut frame = vec![json!("REQ"), json!(subscription_id)];
                for filter in filters {
                    frame.push(serde_json::to_value(filter)?);
                }
                Value::Array(frame)
            }
            ClientMessage::Close { subscription_id } => json!(["CLOSE", subscription_id]),
        };
        Ok(frame.to_string())
    }
}

/// Frames sent from the relay to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum RelayMessage {
    /// `["EVENT", <id>, <event>]`
    Event {
        subscription_id: String,
        event: Box<Event>,
    },
    /// `["EOSE", <id>]`: all stored events have been sent.
    EndOfStoredEvents { subscription_id: String },
    /// `["CLOSED", <id>, <message>]`: the relay ended the subscription.
    Closed {
        subscription_id: String,
        message: String,
    },
    /// `["NOTICE", <message>]`
    Notice { message: String },
    /// `["OK", <event id>, <accepted>, <message>]`
    Ok {
        event_id: String,
        accepted: bool,
        message: String,
    },
}

impl RelayMessage {
    /// Parse a JSON text frame.
    pub fn from_json(frame: &str) -> Result<Self, RelayError> {
        let value: Value = serde_json::from_str(frame)?;
        let parts = value
            .as_array()
            .ok_or_else(|| RelayError::Protocol("frame is not an array".into()))?;

        let kind = str_at(parts, 0)?;
        match kind {
            "EVENT" => {
                let event = parts
                    .get(2)
                    .cloned()
                    .ok_or_else(|| RelayError::Protocol("EVENT without payload".into()))?;
                Ok(RelayMessage::Event {
                    subscription_id: str_at(parts, 1)?.to_string(),
                    event: Box::new(serde_json::from_value(event)?),
                })
            }
            "EOSE" => Ok(RelayMessage::EndOfStoredEvents {
                subscription_id: str_at(parts, 1)?.to_string(),
            }),
            "CLOSED" => Ok(RelayMessage::Closed {
                subscription_id: str_at(parts, 1)?.to_string(),
                message: str_at(parts, 2).unwrap_or_default().to_string(),
            }),
            "NOTICE" => Ok(RelayMessage::Notice {
                message: str_at(parts, 1)?.to_string(),
            }),
            "OK" => Ok(RelayMessage::Ok {
                event_id: str_at(parts, 1)?.to_string(),
                accepted: parts.get(2).and_then(Value::as_bool).unwrap_or(false),
                message: str_at(parts, 3).unwrap_or_default().to_string(),
            }),
            other => Err(RelayError::Protocol(format!("unknown message type: {other}"))),
        }
    }
}

fn str_at(parts: &[Value], index: usize) -> Result<&str, RelayError> {
    parts
        .get(index)
        .and_then(Value::as_str)
        .ok_or_else(|| RelayError::Protocol(format!("expected string at position {index}")))
}
