//! Session model — one row per phone number.

use chrono::{DateTime, Utc};
use rand::distributions::{Alphanumeric, DistString};
use serde::{Deserialize, Serialize};

/// Length of generated session tokens.
const TOKEN_LENGTH: usize = 48;

/// A durable binding of a phone number to an authenticated account.
///
/// At most one active session exists per phone number. Linking the same
/// number again replaces the row (and therefore the token) atomically in the
/// store; the old token is invalid the moment the new row lands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// E.164-normalized phone number — unique key.
    pub phone_number: String,
    /// Opaque reference to the external account.
    pub user_id: String,
    /// Email cached from the Auth Service at login time.
    pub email: String,
    /// Display name cached from the Auth Service at login time.
    pub display_name: String,
    /// Opaque capability token, generated at login. Never guessable.
    pub session_token: String,
    /// When the number was first linked to this account.
    pub linked_at: DateTime<Utc>,
    /// Updated on every read/write touching the session.
    pub last_activity: DateTime<Utc>,
    /// False = logically logged out; the row is kept for history.
    pub is_active: bool,
    /// Sessions past this instant are treated as absent and purged.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session for a successful login.
    pub fn new(
        phone_number: &str,
        user_id: &str,
        email: &str,
        display_name: &str,
        ttl: std::time::Duration,
    ) -> Self {
        let now = Utc::now();
        Self {
            phone_number: normalize_phone(phone_number),
            user_id: user_id.to_string(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            session_token: generate_token(),
            linked_at: now,
            last_activity: now,
            is_active: true,
            expires_at: now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(30)),
        }
    }

    /// Whether the session is usable at `now`.
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && self.expires_at > now
    }
}

/// Generate an opaque session token.
pub fn generate_token() -> String {
    Alphanumeric.sample_string(&mut rand::thread_rng(), TOKEN_LENGTH)
}

/// Normalize a phone number to E.164-ish form: strip separators, ensure a
/// leading `+` when the input carries a country code.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if raw.trim_start().starts_with('+') || digits.len() > 10 {
        format!("+{digits}")
    } else {
        digits
    }
}
