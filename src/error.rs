//! Error types for the trackbot pipeline.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Classification error: {0}")]
    Classify(#[from] ClassifyError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Record service error: {0}")]
    Record(#[from] RecordError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Session store / dedupe store errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Auth Service failure reasons, plus transport failures.
///
/// The four credential variants map 1:1 to fixed user-safe reply strings in
/// the auth flow. `Unavailable` covers transport-level failures (the service
/// itself could not be reached) and also maps to a generic user message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("account not found")]
    NotFound,

    #[error("invalid password")]
    InvalidPassword,

    #[error("account locked")]
    Locked,

    #[error("two-factor authentication required")]
    RequiresTwoFactor,

    #[error("auth service unavailable: {0}")]
    Unavailable(String),
}

/// Classifier backend errors.
#[derive(Debug, thiserror::Error)]
pub enum ClassifyError {
    #[error("Classifier request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid classifier response: {0}")]
    InvalidResponse(String),

    #[error("Classifier timed out after {0:?}")]
    Timeout(Duration),
}

/// Delivery provider errors, split by retryability.
///
/// `Transient` failures (network errors, 5xx) are retried by the dispatcher;
/// `Permanent` failures (recipient not opted in, bad request) are logged and
/// never retried — retrying cannot change a permission-based rejection.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("transient delivery failure: {0}")]
    Transient(String),

    #[error("permanent delivery failure: {0}")]
    Permanent(String),
}

impl DeliveryError {
    /// Whether the dispatcher may retry this failure.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

/// Record-creation service errors.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("Record creation failed: {0}")]
    CreateFailed(String),

    #[error("Record service returned invalid response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
