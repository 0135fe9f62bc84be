//! Mandrill webhook event types.
//!
//! Mandrill posts a form field `mandrill_events` holding a JSON array of
//! events. Only `inbound` events carry a message to route; the rest (`send`,
//! `hard_bounce`, ...) are message activity notifications.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer};

use crate::error::DecodeError;

/// Form field carrying the event batch.
pub const EVENTS_FIELD: &str = "mandrill_events";

/// Discriminator of events that carry a message to route.
pub const INBOUND_EVENT: &str = "inbound";

/// One entry of the `mandrill_events` array.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundEvent {
    /// Event kind, e.g. `inbound` or `send`
    #[serde(default, deserialize_with = "null_as_default")]
    pub event: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub msg: InboundMessage,
}

impl InboundEvent {
    pub fn is_inbound(&self) -> bool {
        self.event == INBOUND_EVENT
    }
}

/// Message portion of an inbound event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InboundMessage {
    /// Full RFC 5322 message as received
    #[serde(default, deserialize_with = "null_as_default")]
    pub raw_msg: String,
    /// Header name to value; Mandrill sends strings, or arrays for repeated headers
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: HashMap<String, serde_json::Value>,
    /// Plain text body
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    /// Recipient address the message was delivered to
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub from_email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subject: String,
}

/// Mandrill sends `null` for absent message parts; treat it like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode the `mandrill_events` form value.
///
/// An empty string is not a valid batch; an empty batch is `[]`.
pub fn decode_events(raw: &str) -> Result<Vec<InboundEvent>, DecodeError> {
    Ok(serde_json::from_str(raw)?)
}
