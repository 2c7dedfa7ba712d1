//! Configuration types.
//!
//! One immutable `BotConfig` is assembled from the environment at startup and
//! passed by reference into each component constructor. Pipeline code never
//! does ambient config lookups.

use std::time::Duration;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Address to bind the webhook HTTP server on.
    pub bind_addr: String,
    /// Path to the local session database.
    pub db_path: String,

    /// Webhook handshake verify token.
    pub verify_token: SecretString,

    /// Delivery provider API base URL (overridable for tests).
    pub provider_api_base: String,
    /// Delivery provider phone-number id (path segment of the send endpoint).
    pub provider_phone_id: String,
    /// Delivery provider access token.
    pub provider_token: SecretString,
    /// Max retries for transient delivery failures.
    pub dispatch_max_retries: u32,
    /// Base delay for exponential backoff between delivery retries.
    pub dispatch_backoff_base: Duration,
    /// Timeout for a single delivery attempt; elapsing counts as transient.
    pub dispatch_request_timeout: Duration,

    /// Classifier backend endpoint URL.
    pub classifier_url: String,
    /// Classifier backend API key.
    pub classifier_api_key: SecretString,
    /// Minimum confidence to accept a primary classification.
    pub confidence_threshold: f32,
    /// Timeout for the primary classifier call.
    pub classifier_timeout: Duration,

    /// Auth service endpoint URL.
    pub auth_service_url: String,
    /// Record-creation service base URL.
    pub records_service_url: String,
    /// Shared API key for the auth and record services.
    pub service_api_key: SecretString,

    /// Session lifetime; refreshed on every authenticated touch.
    pub session_ttl: Duration,
    /// How long a bare `login` waits for credentials before reverting.
    pub pending_auth_ttl: Duration,
    /// How long processed message ids are remembered for dedupe.
    pub dedupe_window: Duration,
    /// Interval between expiry sweeps (sessions + dedupe rows).
    pub sweep_interval: Duration,

    /// Currency code assumed for bare amounts with no symbol.
    pub default_currency: String,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            db_path: "./data/trackbot.db".to_string(),
            verify_token: SecretString::from("change-me"),
            provider_api_base: "https://graph.facebook.com/v19.0".to_string(),
            provider_phone_id: String::new(),
            provider_token: SecretString::from(""),
            dispatch_max_retries: 3,
            dispatch_backoff_base: Duration::from_secs(1),
            dispatch_request_timeout: Duration::from_secs(10),
            classifier_url: String::new(),
            classifier_api_key: SecretString::from(""),
            confidence_threshold: 0.7,
            classifier_timeout: Duration::from_secs(5),
            auth_service_url: String::new(),
            records_service_url: String::new(),
            service_api_key: SecretString::from(""),
            session_ttl: Duration::from_secs(30 * 24 * 3600),
            pending_auth_ttl: Duration::from_secs(300),
            dedupe_window: Duration::from_secs(6 * 3600),
            sweep_interval: Duration::from_secs(600),
            default_currency: "INR".to_string(),
        }
    }
}

impl BotConfig {
    /// Assemble configuration from environment variables.
    ///
    /// Required: `TRACKBOT_VERIFY_TOKEN`, `TRACKBOT_PROVIDER_TOKEN`,
    /// `TRACKBOT_PROVIDER_PHONE_ID`. Everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        Ok(Self {
            bind_addr: env_or("TRACKBOT_BIND_ADDR", &defaults.bind_addr),
            db_path: env_or("TRACKBOT_DB_PATH", &defaults.db_path),
            verify_token: SecretString::from(require_env("TRACKBOT_VERIFY_TOKEN")?),
            provider_api_base: env_or("TRACKBOT_PROVIDER_API_BASE", &defaults.provider_api_base),
            provider_phone_id: require_env("TRACKBOT_PROVIDER_PHONE_ID")?,
            provider_token: SecretString::from(require_env("TRACKBOT_PROVIDER_TOKEN")?),
            dispatch_max_retries: env_parse(
                "TRACKBOT_DISPATCH_RETRIES",
                defaults.dispatch_max_retries,
            )?,
            dispatch_backoff_base: Duration::from_millis(env_parse(
                "TRACKBOT_DISPATCH_BACKOFF_MS",
                defaults.dispatch_backoff_base.as_millis() as u64,
            )?),
            dispatch_request_timeout: Duration::from_millis(env_parse(
                "TRACKBOT_DISPATCH_TIMEOUT_MS",
                defaults.dispatch_request_timeout.as_millis() as u64,
            )?),
            classifier_url: env_or("TRACKBOT_CLASSIFIER_URL", &defaults.classifier_url),
            classifier_api_key: SecretString::from(env_or("TRACKBOT_CLASSIFIER_API_KEY", "")),
            confidence_threshold: env_parse(
                "TRACKBOT_CONFIDENCE_THRESHOLD",
                defaults.confidence_threshold,
            )?,
            classifier_timeout: Duration::from_millis(env_parse(
                "TRACKBOT_CLASSIFIER_TIMEOUT_MS",
                defaults.classifier_timeout.as_millis() as u64,
            )?),
            auth_service_url: env_or("TRACKBOT_AUTH_SERVICE_URL", &defaults.auth_service_url),
            records_service_url: env_or(
                "TRACKBOT_RECORDS_SERVICE_URL",
                &defaults.records_service_url,
            ),
            service_api_key: SecretString::from(env_or("TRACKBOT_SERVICE_API_KEY", "")),
            session_ttl: Duration::from_secs(env_parse(
                "TRACKBOT_SESSION_TTL_SECS",
                defaults.session_ttl.as_secs(),
            )?),
            pending_auth_ttl: Duration::from_secs(env_parse(
                "TRACKBOT_PENDING_AUTH_TTL_SECS",
                defaults.pending_auth_ttl.as_secs(),
            )?),
            dedupe_window: Duration::from_secs(env_parse(
                "TRACKBOT_DEDUPE_WINDOW_SECS",
                defaults.dedupe_window.as_secs(),
            )?),
            sweep_interval: Duration::from_secs(env_parse(
                "TRACKBOT_SWEEP_INTERVAL_SECS",
                defaults.sweep_interval.as_secs(),
            )?),
            default_currency: env_or("TRACKBOT_DEFAULT_CURRENCY", &defaults.default_currency),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse '{raw}'"),
        }),
        Err(_) => Ok(default),
    }
}
