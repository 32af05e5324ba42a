//! Admin access gate
//!
//! A single shared password unlocks the admin operations. A successful
//! login issues a session token that stays valid for a fixed time.

use crate::error::{Error, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

/// Upper bound on the session lifetime (about ten years)
const MAX_TIMEOUT_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// An issued admin session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Password check and session bookkeeping
#[derive(Debug)]
pub struct AdminGate {
    password: String,
    timeout: Duration,
    sessions: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl AdminGate {
    /// Create a gate for `password` whose sessions last `timeout_secs`
    pub fn new(password: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            password: password.into(),
            timeout: Duration::seconds(timeout_secs.min(MAX_TIMEOUT_SECS) as i64),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Check the password and open a session
    pub async fn login(&self, password: &str, now: DateTime<Utc>) -> Result<AdminSession> {
        if password != self.password {
            warn!("Rejected admin login");
            return Err(Error::Unauthorized("wrong password".to_string()));
        }

        let session = AdminSession {
            token: Uuid::new_v4().to_string(),
            expires_at: now + self.timeout,
        };

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, expires_at| *expires_at > now);
        sessions.insert(session.token.clone(), session.expires_at);
        info!("Admin session opened, expires {}", session.expires_at);

        Ok(session)
    }

    /// True if `token` names a live session; expired sessions are dropped
    pub async fn is_authenticated(&self, token: &str, now: DateTime<Utc>) -> bool {
        let expires_at = match self.sessions.read().await.get(token) {
            Some(expires_at) => *expires_at,
            None => return false,
        };

        if now < expires_at {
            true
        } else {
            self.logout(token).await;
            false
        }
    }

    /// Like `is_authenticated`, as a `Result` for handlers
    pub async fn authorize(&self, token: Option<&str>, now: DateTime<Utc>) -> Result<()> {
        let Some(token) = token else {
            return Err(Error::Unauthorized("missing session token".to_string()));
        };

        if self.is_authenticated(token, now).await {
            Ok(())
        } else {
            Err(Error::Unauthorized("session expired or unknown".to_string()))
        }
    }

    /// End a session; unknown tokens are ignored
    pub async fn logout(&self, token: &str) {
        self.sessions.write().await.remove(token);
    }

    /// Number of sessions currently tracked
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
