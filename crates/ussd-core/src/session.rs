//! Session identity for one USSD dialogue
//!
//! A session is created exactly once per successful dial and lives until
//! the operator closes the dialog. Nothing the backend says ends it.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{UssdError, UssdResult};

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Opaque session identifier sent with every turn
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    /// Generate an identifier unique for the lifetime of the process
    ///
    /// Millisecond timestamp plus a process-wide sequence number, so two
    /// sessions opened within the same millisecond still differ.
    pub fn generate() -> Self {
        let seq = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("sess_{}_{}", Utc::now().timestamp_millis(), seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An open dialogue
///
/// Fields are private; once opened, the identifier and dialed code cannot
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UssdSession {
    session_id: SessionId,
    phone_number: String,
    ussd_code: String,
    opened_at: DateTime<Utc>,
}

impl UssdSession {
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn phone_number(&self) -> &str {
        &self.phone_number
    }

    /// The dialed code, as it was when the session opened
    pub fn ussd_code(&self) -> &str {
        &self.ussd_code
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }
}

/// Owns the single active session
#[derive(Debug, Default)]
pub struct SessionManager {
    current: Option<UssdSession>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a session for `code`
    ///
    /// Fails if a session is already active; at most one may exist.
    pub fn open(&mut self, code: impl Into<String>, phone_number: impl Into<String>) -> UssdResult<UssdSession> {
        if let Some(active) = &self.current {
            return Err(UssdError::SessionAlreadyActive {
                session_id: active.session_id.to_string(),
            });
        }

        let session = UssdSession {
            session_id: SessionId::generate(),
            phone_number: phone_number.into(),
            ussd_code: code.into(),
            opened_at: Utc::now(),
        };
        info!("Opened USSD session {} for {}", session.session_id, session.ussd_code);
        self.current = Some(session.clone());
        Ok(session)
    }

    /// Close the active session, if any
    ///
    /// Idempotent. Returns the session that was closed.
    pub fn close(&mut self) -> Option<UssdSession> {
        let closed = self.current.take();
        if let Some(session) = &closed {
            info!("Closed USSD session {}", session.session_id);
        }
        closed
    }

    pub fn current(&self) -> Option<&UssdSession> {
        self.current.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Whether `id` names the active session
    pub fn is_current(&self, id: &SessionId) -> bool {
        self.current.as_ref().is_some_and(|s| &s.session_id == id)
    }
}
