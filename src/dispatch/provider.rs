//! Outbound message delivery to the messaging provider.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::BotConfig;
use crate::error::DeliveryError;

/// Maximum reply length accepted by the provider's text message API.
const MAX_MESSAGE_LENGTH: usize = 4096;

/// Sends reply messages back to users. One implementation talks to the
/// real provider API; tests swap in a recording mock.
#[async_trait]
pub trait DeliveryProvider: Send + Sync {
    /// Deliver `text` to `phone`. A single attempt — retry policy lives
    /// in the [`Dispatcher`](crate::dispatch::Dispatcher).
    async fn send_text(&self, phone: &str, text: &str) -> Result<(), DeliveryError>;
}

/// HTTP client for the WhatsApp-style cloud messaging API.
pub struct HttpDeliveryProvider {
    client: reqwest::Client,
    api_base: String,
    phone_id: String,
    token: SecretString,
}

impl HttpDeliveryProvider {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: config.provider_api_base.trim_end_matches('/').to_string(),
            phone_id: config.provider_phone_id.clone(),
            token: config.provider_token.clone(),
        }
    }

    fn messages_url(&self) -> String {
        format!("{}/{}/messages", self.api_base, self.phone_id)
    }
}

#[async_trait]
impl DeliveryProvider for HttpDeliveryProvider {
    async fn send_text(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        let body = serde_json::json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": phone,
            "type": "text",
            "text": { "body": truncate_message(text) },
        });

        let response = self
            .client
            .post(self.messages_url())
            .bearer_auth(self.token.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transient(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        // 429 and 5xx are worth retrying; 4xx means the request itself
        // is bad and will not improve.
        if status.as_u16() == 429 || status.is_server_error() {
            Err(DeliveryError::Transient(format!(
                "provider returned {status}: {detail}"
            )))
        } else {
            Err(DeliveryError::Permanent(format!(
                "provider returned {status}: {detail}"
            )))
        }
    }
}

/// Clamp a reply to the provider's message length limit on a char boundary.
fn truncate_message(text: &str) -> &str {
    match text.char_indices().nth(MAX_MESSAGE_LENGTH) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_leaves_short_messages_alone() {
        assert_eq!(truncate_message("hello"), "hello");
    }

    #[test]
    fn truncate_clamps_on_char_boundary() {
        let long = "é".repeat(MAX_MESSAGE_LENGTH + 10);
        let clamped = truncate_message(&long);
        assert_eq!(clamped.chars().count(), MAX_MESSAGE_LENGTH);
    }
}
