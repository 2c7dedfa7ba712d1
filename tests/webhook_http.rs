//! Integration tests for the webhook HTTP surface.
//!
//! Each test binds an Axum server on a random port and exercises the
//! real handshake/delivery contract with reqwest.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::net::TcpListener;
use tokio::time::timeout;

use trackbot::BotConfig;
use trackbot::auth::{AuthFlow, AuthService, UserProfile};
use trackbot::classify::{ClassificationResult, Classifier, ClassifierBackend};
use trackbot::dispatch::{DeliveryProvider, Dispatcher};
use trackbot::error::{AuthError, ClassifyError, DeliveryError, RecordError};
use trackbot::extract::DraftRecord;
use trackbot::records::RecordService;
use trackbot::session::SessionStore;
use trackbot::webhook::{AppState, Orchestrator, router};

/// Maximum time any test is allowed to wait before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

struct AcceptingAuth;

#[async_trait]
impl AuthService for AcceptingAuth {
    async fn verify_credentials(
        &self,
        email: &str,
        _password: &str,
    ) -> Result<UserProfile, AuthError> {
        Ok(UserProfile {
            user_id: "user-1".to_string(),
            email: email.to_string(),
            display_name: "Alice".to_string(),
        })
    }
}

struct DownBackend;

#[async_trait]
impl ClassifierBackend for DownBackend {
    async fn classify(&self, _text: &str) -> Result<ClassificationResult, ClassifyError> {
        Err(ClassifyError::RequestFailed("backend down".to_string()))
    }
}

struct NoRecords;

#[async_trait]
impl RecordService for NoRecords {
    async fn create(&self, _: &str, _: &DraftRecord) -> Result<String, RecordError> {
        Ok("rec-1".to_string())
    }
}

/// Provider that sleeps before recording, to make inline processing
/// observable as webhook latency.
struct SlowProvider {
    delay: Duration,
    sent: Mutex<Vec<String>>,
}

impl SlowProvider {
    fn new(delay: Duration) -> Self {
        Self {
            delay,
            sent: Mutex::new(Vec::new()),
        }
    }

    fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl DeliveryProvider for SlowProvider {
    async fn send_text(&self, _phone: &str, text: &str) -> Result<(), DeliveryError> {
        tokio::time::sleep(self.delay).await;
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

/// Start the webhook server on a random port. Returns the base URL and
/// the provider handle for inspecting replies.
async fn start_server(provider: Arc<SlowProvider>) -> (String, Arc<SlowProvider>) {
    let config = BotConfig {
        verify_token: SecretString::from("secret"),
        ..BotConfig::default()
    };
    let store = Arc::new(SessionStore::new_memory().await.unwrap());
    let auth_flow = Arc::new(AuthFlow::new(
        Arc::clone(&store),
        Arc::new(AcceptingAuth),
        config.pending_auth_ttl,
        config.session_ttl,
    ));
    let classifier = Arc::new(Classifier::new(Arc::new(DownBackend), &config));
    let dispatcher = Arc::new(Dispatcher::new(
        provider.clone() as Arc<dyn DeliveryProvider>,
        &config,
    ));
    let orchestrator = Arc::new(Orchestrator::new(
        store,
        auth_flow,
        classifier,
        Arc::new(NoRecords),
        dispatcher,
        &config,
    ));

    let state = AppState {
        orchestrator,
        verify_token: config.verify_token.clone(),
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.ok();
    });

    (format!("http://{addr}"), provider)
}

fn delivery_body(message_id: &str, text: &str) -> serde_json::Value {
    serde_json::json!({
        "object": "whatsapp_business_account",
        "entry": [{
            "changes": [{
                "value": {
                    "messages": [{
                        "id": message_id,
                        "from": "919876543210",
                        "timestamp": "1756508400",
                        "type": "text",
                        "text": { "body": text }
                    }]
                }
            }]
        }]
    })
}

#[tokio::test]
async fn handshake_echoes_challenge_on_matching_token() {
    let (base, _) = start_server(Arc::new(SlowProvider::new(Duration::ZERO))).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!(
            "{base}/webhook?hub.mode=subscribe&hub.verify_token=secret&hub.challenge=12345"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "12345");
}

#[tokio::test]
async fn handshake_rejects_bad_token_and_mode() {
    let (base, _) = start_server(Arc::new(SlowProvider::new(Duration::ZERO))).await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!(
            "{base}/webhook?hub.mode=subscribe&hub.verify_token=wrong&hub.challenge=1"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    let resp = client
        .get(format!(
            "{base}/webhook?hub.mode=unsubscribe&hub.verify_token=secret&hub.challenge=1"
        ))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);
}

#[tokio::test]
async fn delivery_is_acked_before_processing_completes() {
    // Reply delivery takes 2s; the ack must come back well before that.
    let provider = Arc::new(SlowProvider::new(Duration::from_secs(2)));
    let (base, provider) = start_server(provider).await;
    let client = reqwest::Client::new();

    let resp = timeout(
        Duration::from_secs(1),
        client
            .post(format!("{base}/webhook"))
            .json(&delivery_body("wamid.ack1", "status"))
            .send(),
    )
    .await
    .expect("webhook ack must not wait for the pipeline")
    .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(provider.sent_count(), 0, "reply still in flight at ack time");

    // The pipeline still runs to completion afterwards.
    let deadline = tokio::time::Instant::now() + TEST_TIMEOUT;
    while provider.sent_count() == 0 {
        assert!(tokio::time::Instant::now() < deadline, "reply never sent");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

#[tokio::test]
async fn garbage_and_status_payloads_are_acked() {
    let (base, provider) = start_server(Arc::new(SlowProvider::new(Duration::ZERO))).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/webhook"))
        .body("not json at all")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = client
        .post(format!("{base}/webhook"))
        .json(&serde_json::json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"statuses": [{"status": "delivered"}]}}]}]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(provider.sent_count(), 0, "no replies for non-message payloads");
}
