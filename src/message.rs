// ABOUTME: Normalized message types exchanged between this core and the surrounding transport
// ABOUTME: These are the crate's one outward-facing shape — everything upstream decodes into them

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical delivery status vocabulary (spec §3, DeliveryStatusMap).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Delivered,
    Failed,
    Pending,
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Pending => "pending",
        };
        write!(f, "{s}")
    }
}

impl DeliveryStatus {
    /// The canonical token for this status, used as a DeliveryStatusMap key
    /// so that canonical values map to themselves (spec §3 invariant).
    pub fn as_token(&self) -> &'static str {
        match self {
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Pending => "pending",
        }
    }
}

/// Message type of a normalized inbound message (spec §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Sms,
    Ussd,
}

/// USSD session lifecycle event (spec §3, §4.3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionEvent {
    New,
    Continue,
    Close,
}

/// The short message payload: decoded text when the character set was
/// understood, or the raw octets when CodecTable fell back (spec §4.1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Bytes(#[serde(with = "hex_bytes")] Vec<u8>),
}

impl MessageContent {
    pub fn is_empty(&self) -> bool {
        match self {
            MessageContent::Text(t) => t.is_empty(),
            MessageContent::Bytes(b) => b.is_empty(),
        }
    }
}

mod hex_bytes {
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(d)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// A fully normalized inbound message, dispatched by `DeliverProcessor`
/// (spec §3, NormalizedInboundMessage).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizedInboundMessage {
    pub source_addr: String,
    pub destination_addr: String,
    pub short_message: MessageContent,
    pub message_type: MessageType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_event: Option<SessionEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_info: Option<String>,
}

impl NormalizedInboundMessage {
    pub fn sms(source_addr: impl Into<String>, destination_addr: impl Into<String>, short_message: MessageContent) -> Self {
        Self {
            source_addr: source_addr.into(),
            destination_addr: destination_addr.into(),
            short_message,
            message_type: MessageType::Sms,
            session_event: None,
            session_info: None,
        }
    }
}

/// Input to `SubmitProcessor::send` (spec §4.4).
#[derive(Clone, Debug, PartialEq)]
pub struct OutboundMessage {
    pub to_addr: String,
    pub from_addr: String,
    pub content: String,
    pub message_id: String,
    pub session_event: Option<SessionEvent>,
    pub transport_type: String,
    pub transport_metadata: HashMap<String, String>,
}
