//! Inbound webhook payload model.
//!
//! The provider posts deeply nested JSON; everything we don't need is
//! ignored and every level is optional so that status callbacks and
//! unknown shapes fall out as "zero messages" instead of parse errors.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

/// Discriminator the provider sets on message webhooks.
const EXPECTED_OBJECT: &str = "whatsapp_business_account";

/// One text message lifted out of a webhook delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub message_id: String,
    pub phone: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct DeliveryPayload {
    #[serde(default)]
    object: String,
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
struct RawMessage {
    #[serde(default)]
    id: String,
    #[serde(default)]
    from: String,
    #[serde(default)]
    timestamp: String,
    #[serde(default, rename = "type")]
    kind: String,
    text: Option<TextBody>,
}

#[derive(Debug, Deserialize)]
struct TextBody {
    #[serde(default)]
    body: String,
}

impl DeliveryPayload {
    /// Flatten the payload into text messages, in delivery order.
    ///
    /// Payloads with the wrong discriminator, no `messages` arrays
    /// (status callbacks), or non-text messages contribute nothing.
    pub fn into_messages(self) -> Vec<InboundMessage> {
        if self.object != EXPECTED_OBJECT {
            if !self.object.is_empty() {
                tracing::debug!(object = %self.object, "ignoring webhook for unexpected object");
            }
            return Vec::new();
        }

        self.entry
            .into_iter()
            .flat_map(|entry| entry.changes)
            .flat_map(|change| change.value.messages)
            .filter_map(|msg| {
                if msg.kind != "text" {
                    tracing::debug!(kind = %msg.kind, message_id = %msg.id, "skipping non-text message");
                    return None;
                }
                let text = msg.text?.body;
                if msg.id.is_empty() || msg.from.is_empty() || text.is_empty() {
                    return None;
                }
                Some(InboundMessage {
                    message_id: msg.id,
                    phone: msg.from,
                    text,
                    timestamp: parse_timestamp(&msg.timestamp),
                })
            })
            .collect()
    }
}

/// Provider timestamps are unix seconds as a string; fall back to now.
fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    raw.parse::<i64>()
        .ok()
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .unwrap_or_else(Utc::now)
}
