//! Reply dispatch with bounded retry.
//!
//! A [`Dispatcher`] wraps a [`DeliveryProvider`] and retries transient
//! failures with exponential backoff. Permanent failures (malformed
//! request, unknown recipient) are surfaced immediately.

pub mod provider;

use std::sync::Arc;
use std::time::Duration;

pub use provider::{DeliveryProvider, HttpDeliveryProvider};

use crate::config::BotConfig;
use crate::error::DeliveryError;

pub struct Dispatcher {
    provider: Arc<dyn DeliveryProvider>,
    max_retries: u32,
    backoff_base: Duration,
    request_timeout: Duration,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn DeliveryProvider>, config: &BotConfig) -> Self {
        Self {
            provider,
            max_retries: config.dispatch_max_retries,
            backoff_base: config.dispatch_backoff_base,
            request_timeout: config.dispatch_request_timeout,
        }
    }

    /// Send a reply, retrying transient failures up to `max_retries`
    /// times with exponential backoff (base, 2x, 4x, ...). Each attempt
    /// is bounded by `request_timeout`; a hung provider connection is a
    /// transient failure, never an indefinite stall.
    pub async fn send(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        let mut attempt = 0u32;
        loop {
            match self.attempt_send(phone, text).await {
                Ok(()) => {
                    if attempt > 0 {
                        tracing::info!(phone, attempt, "reply delivered after retry");
                    }
                    return Ok(());
                }
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff_base * 2u32.pow(attempt);
                    attempt += 1;
                    tracing::warn!(
                        phone,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "transient delivery failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    tracing::error!(phone, attempt, error = %e, "reply delivery failed");
                    return Err(e);
                }
            }
        }
    }

    async fn attempt_send(&self, phone: &str, text: &str) -> Result<(), DeliveryError> {
        match tokio::time::timeout(self.request_timeout, self.provider.send_text(phone, text))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::Transient(format!(
                "send timed out after {:?}",
                self.request_timeout
            ))),
        }
    }
}
