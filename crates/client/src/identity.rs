//! Email/password identity and the session lifecycle around it.
use chrono::{DateTime, Utc};

use crate::{
    error::{ClientError, Result},
    session::{Session, SessionHub},
};

/// Outcome of a sign-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUp {
    /// The account is active and a session was issued.
    SignedIn(Session),
    /// The provider sent a confirmation link; sign in after confirming.
    ConfirmationRequired { email: String },
}

pub trait IdentityProvider: Send + Sync {
    fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<Session>> + Send;

    fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<SignUp>> + Send;

    /// Exchanges a refresh token for a new session.
    fn refresh(&self, refresh_token: &str) -> impl Future<Output = Result<Session>> + Send;

    /// Revokes `session` on the provider side.
    fn sign_out(&self, session: &Session) -> impl Future<Output = Result<()>> + Send;
}

fn require_credentials(email: &str, password: &str) -> Result<()> {
    if email.trim().is_empty() || password.is_empty() {
        return Err(ClientError::Auth(
            "email and password are required".to_string(),
        ));
    }
    Ok(())
}

/// Drives an [`IdentityProvider`] and publishes the resulting session on a
/// [`SessionHub`].
///
/// A failed sign-in leaves the current session untouched. Sign-out always
/// clears the local session, even when the provider could not be reached.
#[derive(Debug)]
pub struct Authenticator<P> {
    provider: P,
    hub: SessionHub,
}

impl<P: IdentityProvider> Authenticator<P> {
    pub fn new(provider: P, hub: SessionHub) -> Self {
        Self { provider, hub }
    }

    pub fn hub(&self) -> &SessionHub {
        &self.hub
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session> {
        require_credentials(email, password)?;
        let session = self
            .provider
            .sign_in(email.trim(), password)
            .await
            .inspect_err(|err| tracing::warn!("sign-in failed: {err}"))?;
        tracing::info!(user = %session.user_id, "signed in");
        self.hub.set(Some(session.clone()));
        Ok(session)
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<SignUp> {
        require_credentials(email, password)?;
        let outcome = self
            .provider
            .sign_up(email.trim(), password)
            .await
            .inspect_err(|err| tracing::warn!("sign-up failed: {err}"))?;
        match &outcome {
            SignUp::SignedIn(session) => {
                tracing::info!(user = %session.user_id, "signed up");
                self.hub.set(Some(session.clone()));
            }
            SignUp::ConfirmationRequired { email } => {
                tracing::info!(%email, "sign-up awaiting confirmation");
            }
        }
        Ok(outcome)
    }

    pub async fn sign_out(&self) -> Result<()> {
        let Some(session) = self.hub.current() else {
            return Ok(());
        };
        self.hub.set(None);
        tracing::info!(user = %session.user_id, "signed out");
        self.provider
            .sign_out(&session)
            .await
            .inspect_err(|err| tracing::warn!("remote sign-out failed: {err}"))
    }

    /// Publishes a previously persisted session, refreshing it first when it
    /// has expired. A failed refresh leaves the hub signed out.
    pub async fn restore(&self, session: Session, now: DateTime<Utc>) -> Result<Session> {
        if !session.is_expired(now) {
            self.hub.set(Some(session.clone()));
            return Ok(session);
        }
        match self.provider.refresh(&session.refresh_token).await {
            Ok(fresh) => {
                tracing::debug!(user = %fresh.user_id, "session refreshed");
                self.hub.set(Some(fresh.clone()));
                Ok(fresh)
            }
            Err(err) => {
                tracing::warn!("session refresh failed: {err}");
                self.hub.set(None);
                Err(err)
            }
        }
    }
}
