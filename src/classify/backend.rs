//! Classifier backend boundary — the external AI service.
//!
//! The contract is a single request/response call; which model sits behind it
//! is out of scope. The HTTP implementation tolerates the common failure mode
//! of model endpoints wrapping their JSON in markdown fences.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::classify::types::{ClassificationResult, RecordKind};
use crate::error::ClassifyError;

/// External classification backend.
#[async_trait]
pub trait ClassifierBackend: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError>;
}

/// HTTP JSON implementation.
///
/// POSTs `{"text": ...}` and expects
/// `{"type": "expense|food|habit|journal", "confidence": 0.0-1.0, "reasoning": "..."}`
/// — possibly wrapped in markdown or surrounding prose.
pub struct HttpClassifier {
    client: reqwest::Client,
    url: String,
    api_key: SecretString,
}

impl HttpClassifier {
    pub fn new(url: &str, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            api_key,
        }
    }
}

#[derive(serde::Deserialize)]
struct BackendResponse {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    confidence: f32,
    #[serde(default)]
    reasoning: String,
}

#[async_trait]
impl ClassifierBackend for HttpClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult, ClassifyError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&serde_json::json!({ "text": text }))
            .send()
            .await
            .map_err(|e| ClassifyError::RequestFailed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(ClassifyError::RequestFailed(format!(
                "backend returned {status}"
            )));
        }

        let raw = resp
            .text()
            .await
            .map_err(|e| ClassifyError::RequestFailed(e.to_string()))?;
        parse_backend_response(&raw)
    }
}

/// Parse the backend's response body into a `ClassificationResult`.
pub fn parse_backend_response(raw: &str) -> Result<ClassificationResult, ClassifyError> {
    let json_str = extract_json_object(raw);
    let response: BackendResponse = serde_json::from_str(&json_str)
        .map_err(|e| ClassifyError::InvalidResponse(format!("JSON parse error: {e}")))?;

    let kind: RecordKind = response
        .kind
        .parse()
        .map_err(ClassifyError::InvalidResponse)?;

    debug!(kind = %kind, confidence = response.confidence, "Backend classification parsed");
    Ok(ClassificationResult::new(
        kind,
        response.confidence,
        if response.reasoning.is_empty() {
            "backend classification".to_string()
        } else {
            response.reasoning
        },
    ))
}

/// Extract a JSON object from model output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    // Already a JSON object
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in a markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Try to find object bounds in surrounding prose
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}
