//! Record creation against the backend records service.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;

use crate::config::BotConfig;
use crate::error::RecordError;
use crate::extract::DraftRecord;

/// Creates tracked records on behalf of an authenticated user.
#[async_trait]
pub trait RecordService: Send + Sync {
    /// Persist a draft record. Returns the backend's record id.
    async fn create(&self, user_id: &str, draft: &DraftRecord) -> Result<String, RecordError>;
}

/// HTTP client for the records service.
pub struct HttpRecordService {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl HttpRecordService {
    pub fn new(config: &BotConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.records_service_url.trim_end_matches('/').to_string(),
            api_key: config.service_api_key.clone(),
        }
    }
}

#[derive(Deserialize)]
struct CreateResponse {
    id: String,
}

#[async_trait]
impl RecordService for HttpRecordService {
    async fn create(&self, user_id: &str, draft: &DraftRecord) -> Result<String, RecordError> {
        let body = record_payload(user_id, draft)
            .map_err(|e| RecordError::InvalidResponse(format!("serialize draft: {e}")))?;

        let url = format!("{}/records/{}", self.base_url, draft.kind().label());
        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| RecordError::CreateFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RecordError::CreateFailed(format!(
                "records service returned {status}: {detail}"
            )));
        }

        let created: CreateResponse = response
            .json()
            .await
            .map_err(|e| RecordError::InvalidResponse(e.to_string()))?;
        Ok(created.id)
    }
}

/// Build the request body: the draft's fields flattened, tagged with the
/// owning user and the fixed `"source": "chat"` marker.
fn record_payload(user_id: &str, draft: &DraftRecord) -> serde_json::Result<Value> {
    let mut body = serde_json::to_value(draft)?;
    if let Value::Object(map) = &mut body {
        map.insert("user_id".to_string(), Value::String(user_id.to_string()));
        map.insert("source".to_string(), Value::String("chat".to_string()));
    }
    Ok(body)
}
