//! Auth flow — per-phone login state machine.
//!
//! States per phone number: `LOGGED_OUT`, `AWAITING_CREDENTIALS`, `LOGGED_IN`.
//! `LOGGED_IN` is whatever the session store says; `AWAITING_CREDENTIALS` is
//! an in-process marker with a 5-minute TTL that does not survive restarts.
//!
//! Failed logins are deliberately not rate-limited here — lockout policy is
//! owned by the Auth Service and surfaced through its failure reasons.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::auth::command::{Command, split_credentials};
use crate::auth::service::AuthService;
use crate::error::{AuthError, Error};
use crate::session::model::Session;
use crate::session::store::SessionStore;

/// Per-phone auth state machine over the session store.
pub struct AuthFlow {
    store: Arc<SessionStore>,
    auth: Arc<dyn AuthService>,
    /// Phones we prompted for credentials, with the prompt time.
    pending: Mutex<HashMap<String, DateTime<Utc>>>,
    pending_ttl: Duration,
    session_ttl: Duration,
}

impl AuthFlow {
    pub fn new(
        store: Arc<SessionStore>,
        auth: Arc<dyn AuthService>,
        pending_ttl: Duration,
        session_ttl: Duration,
    ) -> Self {
        Self {
            store,
            auth,
            pending: Mutex::new(HashMap::new()),
            pending_ttl,
            session_ttl,
        }
    }

    /// Handle a message if it concerns authentication.
    ///
    /// Returns `Some(reply)` when the message was consumed (a command, or
    /// credentials we were waiting for); `None` when it should continue to
    /// classification. `session` is the store lookup the orchestrator already
    /// performed for this message.
    pub async fn handle_message(
        &self,
        phone: &str,
        text: &str,
        session: Option<&Session>,
    ) -> Result<Option<String>, Error> {
        if let Some(command) = Command::parse(text) {
            return Ok(Some(self.handle_command(phone, command, session).await?));
        }

        // Not a command — were we waiting for credentials from this phone?
        match self.take_pending(phone).await {
            PendingState::None => Ok(None),
            PendingState::Expired => {
                info!(phone, "Pending login expired before credentials arrived");
                Ok(Some(
                    "Login timed out. Send `login <email> <password>` to try again.".to_string(),
                ))
            }
            PendingState::Waiting => match split_credentials(text) {
                Some((email, password)) => {
                    Ok(Some(self.do_login(phone, &email, &password).await?))
                }
                None => Ok(Some(
                    "That doesn't look like `email password`. Send `login` to start over."
                        .to_string(),
                )),
            },
        }
    }

    async fn handle_command(
        &self,
        phone: &str,
        command: Command,
        session: Option<&Session>,
    ) -> Result<String, Error> {
        match command {
            Command::Login { email, password } => self.do_login(phone, &email, &password).await,
            Command::LoginBare => {
                self.pending.lock().await.insert(phone.to_string(), Utc::now());
                Ok("Please reply with your credentials: `email password`".to_string())
            }
            Command::Logout => {
                self.pending.lock().await.remove(phone);
                let had_session = self.store.deactivate(phone).await.map_err(Error::Store)?;
                Ok(if had_session {
                    "You've been logged out. Send `login <email> <password>` to link again."
                        .to_string()
                } else {
                    "You're not logged in.".to_string()
                })
            }
            Command::Status => Ok(match session {
                Some(s) => format!("Logged in as {}.", mask_email(&s.email)),
                None => "Logged out. Send `login <email> <password>` to link your account."
                    .to_string(),
            }),
            Command::Help => Ok(help_text()),
        }
    }

    /// Verify credentials and create/replace the session.
    async fn do_login(&self, phone: &str, email: &str, password: &str) -> Result<String, Error> {
        self.pending.lock().await.remove(phone);

        match self.auth.verify_credentials(email, password).await {
            Ok(profile) => {
                let session = Session::new(
                    phone,
                    &profile.user_id,
                    &profile.email,
                    &profile.display_name,
                    self.session_ttl,
                );
                self.store.upsert(&session).await.map_err(Error::Store)?;
                info!(phone, user_id = %profile.user_id, "Phone linked to account");
                Ok(format!(
                    "Welcome, {}! Your number is now linked. Just text me what you \
                     spent, ate, did, or felt and I'll log it.",
                    profile.display_name
                ))
            }
            Err(reason) => {
                // User-safe fixed messages only — never raw backend text.
                warn!(phone, reason = %reason, "Login failed");
                Ok(login_failure_reply(&reason).to_string())
            }
        }
    }

    /// Consume the pending-credentials marker for a phone, classifying it.
    async fn take_pending(&self, phone: &str) -> PendingState {
        let mut pending = self.pending.lock().await;
        match pending.remove(phone) {
            None => PendingState::None,
            Some(since) => {
                let ttl = chrono::Duration::from_std(self.pending_ttl)
                    .unwrap_or(chrono::Duration::minutes(5));
                if Utc::now() - since > ttl {
                    PendingState::Expired
                } else {
                    PendingState::Waiting
                }
            }
        }
    }

    /// Drop pending-credentials markers older than the TTL. Phones that
    /// went silent after a bare `login` would otherwise sit in the map
    /// forever. Returns how many were dropped.
    pub async fn sweep_expired_pending(&self) -> usize {
        let ttl = chrono::Duration::from_std(self.pending_ttl)
            .unwrap_or(chrono::Duration::minutes(5));
        let cutoff = Utc::now() - ttl;
        let mut pending = self.pending.lock().await;
        let before = pending.len();
        pending.retain(|_, since| *since > cutoff);
        before - pending.len()
    }

    /// Test hook: whether a phone is currently awaiting credentials.
    #[cfg(test)]
    async fn is_awaiting(&self, phone: &str) -> bool {
        self.pending.lock().await.contains_key(phone)
    }
}

enum PendingState {
    None,
    Waiting,
    Expired,
}

/// Fixed, user-safe reply per Auth Service failure reason.
fn login_failure_reply(reason: &AuthError) -> &'static str {
    match reason {
        AuthError::NotFound => "No account found for that email.",
        AuthError::InvalidPassword => "That password doesn't match. Please try again.",
        AuthError::Locked => {
            "Your account is locked. Please reset your password from the app first."
        }
        AuthError::RequiresTwoFactor => {
            "Your account uses two-factor authentication. Please link this number from the app."
        }
        AuthError::Unavailable(_) => "Login is temporarily unavailable. Please try again shortly.",
    }
}

/// Mask an email for status replies: keep the first character of the local
/// part and the full domain.
fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap();
            format!("{first}***@{domain}")
        }
        _ => "***".to_string(),
    }
}

fn help_text() -> String {
    "I turn your texts into records:\n\
     • `450 Uber` — log an expense\n\
     • `ate breakfast - toast and eggs` — log a meal\n\
     • `meditation done` — log a habit\n\
     • anything else — journal entry\n\
     Commands: `login <email> <password>`, `logout`, `status`, `help`"
        .to_string()
}
