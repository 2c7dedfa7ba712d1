//! Auth Service boundary — credential verification.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::error::AuthError;

/// Account profile returned by a successful credential check.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    pub display_name: String,
}

/// External account/password verification service.
///
/// Email matching is case-insensitive on the service side; callers pass the
/// email as the user typed it.
#[async_trait]
pub trait AuthService: Send + Sync {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError>;
}

/// HTTP implementation against the account service's verify endpoint.
pub struct HttpAuthService {
    client: reqwest::Client,
    url: String,
    api_key: SecretString,
}

impl HttpAuthService {
    pub fn new(url: &str, api_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.to_string(),
            api_key,
        }
    }
}

/// Success body: `{"user_id": "...", "email": "...", "display_name": "..."}`.
#[derive(Deserialize)]
struct VerifyOk {
    user_id: String,
    email: String,
    #[serde(default)]
    display_name: String,
}

/// Failure body: `{"reason": "NOT_FOUND" | "INVALID_PASSWORD" | "LOCKED" | "REQUIRES_2FA"}`.
#[derive(Deserialize)]
struct VerifyFailure {
    #[serde(default)]
    reason: String,
}

#[async_trait]
impl AuthService for HttpAuthService {
    async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let resp = self
            .client
            .post(&self.url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            let ok: VerifyOk = resp
                .json()
                .await
                .map_err(|e| AuthError::Unavailable(format!("bad verify body: {e}")))?;
            let display_name = if ok.display_name.is_empty() {
                ok.email.clone()
            } else {
                ok.display_name
            };
            return Ok(UserProfile {
                user_id: ok.user_id,
                email: ok.email,
                display_name,
            });
        }

        if status.is_client_error() {
            let failure: VerifyFailure = resp.json().await.unwrap_or(VerifyFailure {
                reason: String::new(),
            });
            return Err(map_failure_reason(&failure.reason));
        }

        Err(AuthError::Unavailable(format!(
            "auth service returned {status}"
        )))
    }
}

/// Map the service's failure reason string to a typed error.
/// Unknown reasons degrade to `InvalidPassword` — the safest user message.
fn map_failure_reason(reason: &str) -> AuthError {
    match reason {
        "NOT_FOUND" => AuthError::NotFound,
        "INVALID_PASSWORD" => AuthError::InvalidPassword,
        "LOCKED" => AuthError::Locked,
        "REQUIRES_2FA" => AuthError::RequiresTwoFactor,
        _ => AuthError::InvalidPassword,
    }
}
