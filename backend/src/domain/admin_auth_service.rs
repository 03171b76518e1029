//! Admin authentication service.
//!
//! Checks the submitted password against the configured account, issues an
//! opaque token, and stores only the token's digest with an expiry.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{AdminAuth, AdminLogin, AdminSessionRepository, AdminSessionRepositoryError};
use crate::domain::{
    AdminAccount, AdminCapability, AdminCredentials, AdminSession, AdminSessionToken, Error,
};

/// Default admin session lifetime.
pub const DEFAULT_SESSION_TTL: TimeDelta = TimeDelta::hours(24);

fn map_repository_error(error: AdminSessionRepositoryError) -> Error {
    match error {
        AdminSessionRepositoryError::Connection { message } => {
            error!(%message, "admin session store unavailable");
            Error::service_unavailable(format!("admin session repository unavailable: {message}"))
        }
        AdminSessionRepositoryError::Query { message } => {
            error!(%message, "admin session store query failed");
            Error::internal(format!("admin session repository error: {message}"))
        }
    }
}

/// Admin auth service implementing the [`AdminAuth`] driving port.
#[derive(Clone)]
pub struct AdminAuthService<S> {
    sessions: Arc<S>,
    account: AdminAccount,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

impl<S> AdminAuthService<S> {
    /// Create a service for `account` using the default session lifetime.
    pub fn new(sessions: Arc<S>, account: AdminAccount, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions,
            account,
            clock,
            ttl: DEFAULT_SESSION_TTL,
        }
    }

    /// Override the session lifetime.
    #[must_use]
    pub fn with_ttl(mut self, ttl: TimeDelta) -> Self {
        self.ttl = ttl;
        self
    }
}

#[async_trait]
impl<S> AdminAuth for AdminAuthService<S>
where
    S: AdminSessionRepository,
{
    async fn login(&self, credentials: &AdminCredentials) -> Result<AdminLogin, Error> {
        if !self.account.verify(credentials) {
            warn!(username = credentials.username(), "admin login rejected");
            return Err(Error::unauthorized("invalid credentials"));
        }

        let created_at = self.clock.utc();
        let expires_at = created_at.checked_add_signed(self.ttl).ok_or_else(|| {
            error!(ttl_seconds = self.ttl.num_seconds(), "admin session expiry out of range");
            Error::internal("admin session expiry is out of range")
        })?;
        let token = AdminSessionToken::generate();
        let session = AdminSession {
            token_digest: token.digest(),
            username: self.account.username().to_owned(),
            created_at,
            expires_at,
        };
        self.sessions
            .insert(&session)
            .await
            .map_err(map_repository_error)?;
        info!(username = %session.username, "admin session opened");

        Ok(AdminLogin {
            token,
            username: session.username,
            expires_at: session.expires_at,
        })
    }

    async fn authorize(&self, token: &AdminSessionToken) -> Result<AdminCapability, Error> {
        let digest = token.digest();
        let session = self
            .sessions
            .find_by_digest(&digest)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::unauthorized("login required"))?;

        if session.is_expired_at(self.clock.utc()) {
            self.sessions
                .delete_by_digest(&digest)
                .await
                .map_err(map_repository_error)?;
            info!(username = %session.username, "admin session expired");
            return Err(Error::unauthorized("session expired"));
        }
        Ok(AdminCapability::granted_to(session.username))
    }

    async fn logout(&self, token: &AdminSessionToken) -> Result<(), Error> {
        self.sessions
            .delete_by_digest(&token.digest())
            .await
            .map_err(map_repository_error)
    }
}
