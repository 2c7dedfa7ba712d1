//! Per-message pipeline: session lookup → auth → classify → extract →
//! record creation → reply.
//!
//! Processing is serialized per phone number (a fair async mutex per
//! phone) so auth state transitions never race; different phones run
//! concurrently. Every failure is absorbed here — callers always ack.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::auth::AuthFlow;
use crate::classify::Classifier;
use crate::config::BotConfig;
use crate::dispatch::Dispatcher;
use crate::error::Error;
use crate::extract;
use crate::records::RecordService;
use crate::session::{SessionStore, normalize_phone};
use crate::webhook::payload::InboundMessage;
use crate::webhook::reply;

#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<SessionStore>,
    auth_flow: Arc<AuthFlow>,
    classifier: Arc<Classifier>,
    records: Arc<dyn RecordService>,
    dispatcher: Arc<Dispatcher>,
    session_ttl: Duration,
    default_currency: String,
    /// One lock per phone number. tokio's Mutex is fair, so messages
    /// queue in arrival order.
    lanes: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl Orchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        auth_flow: Arc<AuthFlow>,
        classifier: Arc<Classifier>,
        records: Arc<dyn RecordService>,
        dispatcher: Arc<Dispatcher>,
        config: &BotConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                auth_flow,
                classifier,
                records,
                dispatcher,
                session_ttl: config.session_ttl,
                default_currency: config.default_currency.clone(),
                lanes: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Process every message in a webhook delivery. Messages for the
    /// same phone keep their arrival order; distinct phones run in
    /// parallel. Returns once all messages are fully handled.
    pub async fn handle_delivery(&self, messages: Vec<InboundMessage>) {
        let mut groups: Vec<(String, Vec<InboundMessage>)> = Vec::new();
        for message in messages {
            let phone = normalize_phone(&message.phone);
            match groups.iter_mut().find(|(p, _)| *p == phone) {
                Some((_, group)) => group.push(message),
                None => groups.push((phone, vec![message])),
            }
        }

        let mut tasks = JoinSet::new();
        for (phone, group) in groups {
            let inner = Arc::clone(&self.inner);
            tasks.spawn(async move {
                let lane = inner.lane(&phone);
                let _guard = lane.lock().await;
                for message in group {
                    inner.process_message(&phone, &message).await;
                }
            });
        }
        while let Some(result) = tasks.join_next().await {
            if let Err(e) = result {
                error!(error = %e, "message processing task panicked");
            }
        }
    }

    /// Drop lane locks no task currently holds a handle to. A strong
    /// count above one means a delivery task still owns a clone, so the
    /// lane stays. Returns how many were dropped.
    pub fn sweep_idle_lanes(&self) -> usize {
        let mut lanes = self.inner.lanes.lock().unwrap_or_else(|e| e.into_inner());
        let before = lanes.len();
        lanes.retain(|_, lane| Arc::strong_count(lane) > 1);
        before - lanes.len()
    }
}

impl Inner {
    fn lane(&self, phone: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut lanes = self.lanes.lock().unwrap_or_else(|e| e.into_inner());
        lanes.entry(phone.to_string()).or_default().clone()
    }

    /// Handle one message end to end. Never returns an error to the
    /// caller: failures are logged and, where possible, turned into a
    /// generic apology reply.
    async fn process_message(&self, phone: &str, message: &InboundMessage) {
        match self.store.mark_processed(&message.message_id).await {
            Ok(true) => {}
            Ok(false) => {
                debug!(message_id = %message.message_id, "duplicate delivery, dropping");
                return;
            }
            Err(e) => {
                // Without the dedupe record we cannot safely process: a
                // provider retry would duplicate the reply.
                error!(message_id = %message.message_id, error = %e, "dedupe check failed");
                return;
            }
        }

        let reply_text = match self.run_pipeline(phone, &message.text).await {
            Ok(text) => text,
            Err(e) => {
                error!(phone, message_id = %message.message_id, error = %e, "pipeline failed");
                reply::generic_error()
            }
        };

        if let Err(e) = self.dispatcher.send(phone, &reply_text).await {
            warn!(phone, error = %e, "reply could not be delivered");
        }
    }

    async fn run_pipeline(&self, phone: &str, text: &str) -> Result<String, Error> {
        let session = self.store.find_active(phone, self.session_ttl).await?;

        // Commands and in-flight login exchanges end here.
        if let Some(reply) = self
            .auth_flow
            .handle_message(phone, text, session.as_ref())
            .await?
        {
            return Ok(reply);
        }

        let Some(session) = session else {
            return Ok(reply::login_prompt());
        };

        let classification = self.classifier.classify(text).await;
        let draft = extract::extract(classification.kind, text, &self.default_currency);

        match self.records.create(&session.user_id, &draft).await {
            Ok(record_id) => {
                info!(
                    phone,
                    user_id = %session.user_id,
                    kind = %classification.kind,
                    confidence = classification.confidence,
                    record_id = %record_id,
                    "record created"
                );
                Ok(reply::confirmation(&draft))
            }
            Err(e) => {
                error!(phone, user_id = %session.user_id, error = %e, "record creation failed");
                Ok(reply::save_failed())
            }
        }
    }
}
