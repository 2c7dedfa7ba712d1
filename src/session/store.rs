//! libSQL-backed session store.
//!
//! Holds the sessions table and the webhook dedupe table. The
//! at-most-one-active-session invariant is enforced by the schema (phone
//! number is the primary key) plus an atomic upsert for replacement.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use libsql::{Connection, Database, params};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::session::migrations;
use crate::session::model::{Session, normalize_phone};

/// Session + dedupe store over a local libSQL database.
///
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use;
/// a single connection is reused for all operations.
pub struct SessionStore {
    #[allow(dead_code)]
    db: Arc<Database>,
    conn: Connection,
}

impl SessionStore {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Connection(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to open database: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        info!(path = %path.display(), "Session database opened");

        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Create an in-memory store (for tests).
    pub async fn new_memory() -> Result<Self, StoreError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| StoreError::Connection(format!("Failed to create db: {e}")))?;
        let conn = db
            .connect()
            .map_err(|e| StoreError::Connection(format!("Failed to create connection: {e}")))?;

        migrations::run_migrations(&conn).await?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    // ── Sessions ────────────────────────────────────────────────────

    /// Look up the live session for a phone number.
    ///
    /// Expired or deactivated rows are treated as absent — the caller sees
    /// exactly what it would see with no session at all. On a hit, the row's
    /// `last_activity` is stamped and `expires_at` pushed forward by `ttl`
    /// (sessions expire after a window of *inactivity*).
    pub async fn find_active(
        &self,
        phone: &str,
        ttl: std::time::Duration,
    ) -> Result<Option<Session>, StoreError> {
        let phone = normalize_phone(phone);
        let now = Utc::now();

        let mut rows = self
            .conn
            .query(
                "SELECT phone_number, user_id, email, display_name, session_token,
                        linked_at, last_activity, is_active, expires_at
                 FROM sessions WHERE phone_number = ?1",
                params![phone.clone()],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let Some(row) = rows
            .next()
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?
        else {
            return Ok(None);
        };

        let mut session = row_to_session(&row)?;
        if !session.is_live(now) {
            debug!(phone = %phone, "Session exists but is expired or inactive");
            return Ok(None);
        }

        session.last_activity = now;
        session.expires_at =
            now + chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::days(30));
        self.conn
            .execute(
                "UPDATE sessions SET last_activity = ?1, expires_at = ?2 WHERE phone_number = ?3",
                params![
                    session.last_activity.to_rfc3339(),
                    session.expires_at.to_rfc3339(),
                    phone
                ],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(Some(session))
    }

    /// Create or replace the session for a phone number, atomically.
    ///
    /// An existing row for the number is overwritten field-for-field in one
    /// statement, which invalidates the prior token the moment this returns.
    pub async fn upsert(&self, session: &Session) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO sessions (phone_number, user_id, email, display_name,
                                       session_token, linked_at, last_activity,
                                       is_active, expires_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(phone_number) DO UPDATE SET
                     user_id = excluded.user_id,
                     email = excluded.email,
                     display_name = excluded.display_name,
                     session_token = excluded.session_token,
                     linked_at = excluded.linked_at,
                     last_activity = excluded.last_activity,
                     is_active = excluded.is_active,
                     expires_at = excluded.expires_at",
                params![
                    session.phone_number.clone(),
                    session.user_id.clone(),
                    session.email.clone(),
                    session.display_name.clone(),
                    session.session_token.clone(),
                    session.linked_at.to_rfc3339(),
                    session.last_activity.to_rfc3339(),
                    session.is_active as i64,
                    session.expires_at.to_rfc3339()
                ],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    /// Logically log out a phone number. The row is kept.
    /// Returns true if a row was deactivated.
    pub async fn deactivate(&self, phone: &str) -> Result<bool, StoreError> {
        let changed = self
            .conn
            .execute(
                "UPDATE sessions SET is_active = 0, last_activity = ?1 WHERE phone_number = ?2",
                params![Utc::now().to_rfc3339(), normalize_phone(phone)],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(changed > 0)
    }

    /// Delete sessions whose `expires_at` has passed. Returns rows removed.
    pub async fn purge_expired(&self) -> Result<usize, StoreError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM sessions WHERE expires_at <= ?1",
                params![Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        if removed > 0 {
            info!(removed, "Purged expired sessions");
        }
        Ok(removed as usize)
    }

    // ── Message dedupe ──────────────────────────────────────────────

    /// Record a provider message id. Returns true if this is the first time
    /// the id was seen (i.e. the message should be processed).
    pub async fn mark_processed(&self, message_id: &str) -> Result<bool, StoreError> {
        let inserted = self
            .conn
            .execute(
                "INSERT OR IGNORE INTO processed_messages (message_id, seen_at) VALUES (?1, ?2)",
                params![message_id, Utc::now().to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(inserted > 0)
    }

    /// Evict dedupe entries older than `window`. Returns rows removed.
    ///
    /// The window only needs to cover the provider's own retry horizon
    /// (a few hours).
    pub async fn evict_processed(
        &self,
        window: std::time::Duration,
    ) -> Result<usize, StoreError> {
        let cutoff = Utc::now()
            - chrono::Duration::from_std(window).unwrap_or(chrono::Duration::hours(6));
        let removed = self
            .conn
            .execute(
                "DELETE FROM processed_messages WHERE seen_at < ?1",
                params![cutoff.to_rfc3339()],
            )
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(removed as usize)
    }
}

// ── Row mapping ─────────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

fn row_to_session(row: &libsql::Row) -> Result<Session, StoreError> {
    let get_str = |i: i32| -> Result<String, StoreError> {
        row.get::<String>(i)
            .map_err(|e| StoreError::Query(format!("column {i}: {e}")))
    };

    Ok(Session {
        phone_number: get_str(0)?,
        user_id: get_str(1)?,
        email: get_str(2)?,
        display_name: get_str(3)?,
        session_token: get_str(4)?,
        linked_at: parse_datetime(&get_str(5)?),
        last_activity: parse_datetime(&get_str(6)?),
        is_active: row
            .get::<i64>(7)
            .map_err(|e| StoreError::Query(e.to_string()))?
            != 0,
        expires_at: parse_datetime(&get_str(8)?),
    })
}
