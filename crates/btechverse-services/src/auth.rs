//! Identity, session state and the admin allow-list.
//!
//! The authentication provider is an external collaborator behind
//! [`IdentityProvider`]. The signed-in identity lives in a [`SessionContext`]
//! that callers pass around explicitly and subscribe to for changes.

use async_trait::async_trait;
use btechverse_core::constants::SIGNUP_TIMEOUT_SECS;
use btechverse_core::{AppError, Config, Identity};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Identity provider did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Identity provider error: {0}")]
    Provider(String),
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => AppError::Unauthorized(err.to_string()),
            AuthError::Timeout(_) => AppError::Timeout(err.to_string()),
            AuthError::Provider(msg) => AppError::Internal(msg),
        }
    }
}

/// The one list of addresses allowed to upload and delete resources.
///
/// Entries are trimmed and lower-cased; lookups are case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AdminAllowList {
    emails: HashSet<String>,
}

impl AdminAllowList {
    pub fn new<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let emails = emails
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { emails }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.admin_emails())
    }

    pub fn contains(&self, email: &str) -> bool {
        self.emails.contains(&email.trim().to_lowercase())
    }

    pub fn is_admin(&self, identity: &Identity) -> bool {
        self.contains(&identity.email)
    }

    /// `Forbidden` unless `identity` is on the list.
    pub fn require_admin(&self, identity: &Identity, action: &str) -> Result<(), AppError> {
        if self.is_admin(identity) {
            return Ok(());
        }
        tracing::warn!(
            user_id = %identity.user_id,
            email = %identity.email,
            action = %action,
            "Non-admin attempted an admin-only action"
        );
        Err(AppError::Forbidden(format!(
            "Only administrators can {}",
            action
        )))
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }
}

/// The currently signed-in identity, with change notification.
///
/// Cloning shares the same underlying session.
#[derive(Clone)]
pub struct SessionContext {
    sender: Arc<watch::Sender<Option<Identity>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn set(&self, identity: Identity) {
        tracing::debug!(user_id = %identity.user_id, "Session identity set");
        self.sender.send_replace(Some(identity));
    }

    pub fn clear(&self) {
        self.sender.send_replace(None);
    }

    pub fn current(&self) -> Option<Identity> {
        self.sender.borrow().clone()
    }

    /// Receiver notified on every sign-in and sign-out.
    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.sender.subscribe()
    }
}

impl Default for SessionContext {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// External authentication collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError>;
}

/// Drives an [`IdentityProvider`] and keeps a [`SessionContext`] in step.
#[derive(Clone)]
pub struct AuthClient {
    provider: Arc<dyn IdentityProvider>,
    session: SessionContext,
    signup_timeout: Duration,
}

impl AuthClient {
    pub fn new(provider: Arc<dyn IdentityProvider>, session: SessionContext) -> Self {
        Self {
            provider,
            session,
            signup_timeout: Duration::from_secs(SIGNUP_TIMEOUT_SECS),
        }
    }

    pub fn with_signup_timeout(mut self, timeout: Duration) -> Self {
        self.signup_timeout = timeout;
        self
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Create an account. The provider call races a client-side timeout;
    /// a late answer is dropped and the session is left untouched.
    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity =
            tokio::time::timeout(self.signup_timeout, self.provider.sign_up(credentials))
                .await
                .map_err(|_| {
                    tracing::warn!(
                        timeout_secs = self.signup_timeout.as_secs_f64(),
                        "Sign-up timed out"
                    );
                    AuthError::Timeout(self.signup_timeout)
                })??;

        self.session.set(identity.clone());
        Ok(identity)
    }

    #[tracing::instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Identity, AuthError> {
        let identity = self.provider.sign_in(credentials).await?;
        self.session.set(identity.clone());
        Ok(identity)
    }

    pub fn sign_out(&self) {
        self.session.clear();
    }
}
