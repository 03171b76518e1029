//! Driving port for admin login, authorisation and logout.
//!
//! Inbound adapters call it to turn credentials into a session token and a
//! token back into an [`AdminCapability`] without knowing how sessions are
//! stored.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{AdminCapability, AdminCredentials, AdminSessionToken, Error};

/// A freshly issued admin session.
#[derive(Debug, Clone)]
pub struct AdminLogin {
    /// Session token for the cookie.
    pub token: AdminSessionToken,
    /// Administrator login name.
    pub username: String,
    /// When the session lapses.
    pub expires_at: DateTime<Utc>,
}

/// Driving port for admin login, session checks and logout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminAuth: Send + Sync {
    /// Verify credentials and open a session. Wrong credentials yield
    /// `Unauthorized`.
    async fn login(&self, credentials: &AdminCredentials) -> Result<AdminLogin, Error>;

    /// Exchange a presented token for a capability. Unknown or expired
    /// tokens yield `Unauthorized`.
    async fn authorize(&self, token: &AdminSessionToken) -> Result<AdminCapability, Error>;

    /// Close the session. Unknown tokens are ignored.
    async fn logout(&self, token: &AdminSessionToken) -> Result<(), Error>;
}

/// Fixture that refuses every login and token.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdminAuth;

#[async_trait]
impl AdminAuth for FixtureAdminAuth {
    async fn login(&self, _credentials: &AdminCredentials) -> Result<AdminLogin, Error> {
        Err(Error::unauthorized("invalid credentials"))
    }

    async fn authorize(&self, _token: &AdminSessionToken) -> Result<AdminCapability, Error> {
        Err(Error::unauthorized("login required"))
    }

    async fn logout(&self, _token: &AdminSessionToken) -> Result<(), Error> {
        Ok(())
    }
}
