//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::Key;
use chrono::TimeDelta;

use clinic_backend::domain::{AdminAccount, DEFAULT_SESSION_TTL, DEFAULT_UTC_OFFSET_MINUTES};
use clinic_backend::outbound::persistence::DbPool;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) admin_account: AdminAccount,
    pub(crate) session_ttl: TimeDelta,
    pub(crate) utc_offset_minutes: i32,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Configuration with the default session TTL and clinic offset.
    #[must_use]
    pub fn new(
        key: Key,
        cookie_secure: bool,
        bind_addr: SocketAddr,
        admin_account: AdminAccount,
    ) -> Self {
        Self {
            key,
            cookie_secure,
            bind_addr,
            admin_account,
            session_ttl: DEFAULT_SESSION_TTL,
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            db_pool: None,
        }
    }

    /// Attach a database pool. Without one the server uses in-memory stores.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    /// Set the admin session lifetime.
    #[must_use]
    pub fn with_session_ttl(mut self, ttl: TimeDelta) -> Self {
        self.session_ttl = ttl;
        self
    }

    /// Set the clinic offset from UTC.
    #[must_use]
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Self {
        self.utc_offset_minutes = minutes;
        self
    }
}
