//! Signed-in session and change notifications.
//!
//! [`SessionHub`] owns the current session; every interested party holds a
//! [`SessionSubscription`] and drops it (or calls
//! [`SessionSubscription::unsubscribe`]) on teardown.

use std::sync::Arc;

use api_types::auth::TokenResponse;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    pub user_id: Uuid,
    pub email: String,
}

impl Session {
    pub(crate) fn from_token(token: TokenResponse, now: DateTime<Utc>) -> Self {
        Self {
            access_token: token.access_token,
            refresh_token: token.refresh_token,
            expires_at: now + Duration::seconds(token.expires_in),
            user_id: token.user.id,
            email: token.user.email.unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Process-wide holder of the current session, scoped to the running
/// application.
#[derive(Clone, Debug)]
pub struct SessionHub {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionHub {
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Replaces the session and notifies every subscriber.
    pub fn set(&self, session: Option<Session>) {
        self.tx.send_replace(session);
    }

    pub fn subscribe(&self) -> SessionSubscription {
        SessionSubscription {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscribers(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for SessionHub {
    fn default() -> Self {
        Self::new(None)
    }
}

#[derive(Debug)]
pub struct SessionSubscription {
    rx: watch::Receiver<Option<Session>>,
}

impl SessionSubscription {
    #[must_use]
    pub fn current(&self) -> Option<Session> {
        self.rx.borrow().clone()
    }

    #[must_use]
    pub fn is_signed_in(&self) -> bool {
        self.rx.borrow().is_some()
    }

    /// `true` when the session changed since it was last seen.
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Marks the current value as seen and returns it.
    pub fn mark_seen(&mut self) -> Option<Session> {
        self.rx.borrow_and_update().clone()
    }

    /// Waits for the next change. Returns `None` once the hub is gone.
    pub async fn changed(&mut self) -> Option<Option<Session>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    pub fn unsubscribe(self) {
        drop(self);
    }
}
