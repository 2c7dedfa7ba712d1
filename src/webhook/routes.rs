//! HTTP surface: webhook verification handshake, message deliveries,
//! and a liveness probe.

use std::sync::Arc;

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::{info, warn};

use crate::webhook::orchestrator::Orchestrator;
use crate::webhook::payload::DeliveryPayload;

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub verify_token: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct VerifyParams {
    #[serde(rename = "hub.mode", alias = "mode", default)]
    mode: String,
    #[serde(rename = "hub.verify_token", alias = "verify_token", default)]
    verify_token: String,
    #[serde(rename = "hub.challenge", alias = "challenge", default)]
    challenge: String,
}

/// GET /webhook — subscription handshake. Echoes the challenge iff the
/// mode and token match; side-effect free.
async fn verify_handshake(
    State(state): State<AppState>,
    Query(params): Query<VerifyParams>,
) -> impl IntoResponse {
    if params.mode == "subscribe" && params.verify_token == *state.verify_token.expose_secret() {
        info!("webhook verification handshake accepted");
        (StatusCode::OK, params.challenge)
    } else {
        warn!(mode = %params.mode, "webhook verification handshake rejected");
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// POST /webhook — message delivery. Always acknowledges with 200, even
/// for unknown shapes; the provider must never see a processing failure.
///
/// The pipeline runs after the ack: classifier and dispatcher budgets
/// (and retry backoff) must not hold the provider's webhook call open.
/// Per-phone ordering is preserved by the orchestrator's lanes, and
/// dedupe is persisted, so redelivery during processing stays safe.
async fn handle_delivery(
    State(state): State<AppState>,
    body: String,
) -> StatusCode {
    let messages = match serde_json::from_str::<DeliveryPayload>(&body) {
        Ok(payload) => payload.into_messages(),
        Err(e) => {
            warn!(error = %e, "unparseable webhook payload, acknowledging anyway");
            return StatusCode::OK;
        }
    };

    if !messages.is_empty() {
        let orchestrator = Arc::clone(&state.orchestrator);
        tokio::spawn(async move {
            orchestrator.handle_delivery(messages).await;
        });
    }
    StatusCode::OK
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", get(verify_handshake).post(handle_delivery))
        .route("/health", get(health))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
