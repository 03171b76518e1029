//! Port for persisted admin sessions, keyed by token digest.

use async_trait::async_trait;

use crate::domain::AdminSession;

use super::define_port_error;

define_port_error! {
    /// Errors raised by admin session repository adapters.
    pub enum AdminSessionRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "admin session repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "admin session repository query failed: {message}",
    }
}

/// Port for storing admin sessions by token digest.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AdminSessionRepository: Send + Sync {
    async fn insert(&self, session: &AdminSession) -> Result<(), AdminSessionRepositoryError>;

    async fn find_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<AdminSession>, AdminSessionRepositoryError>;

    /// Remove a session. Deleting an unknown digest is not an error.
    async fn delete_by_digest(&self, token_digest: &str)
    -> Result<(), AdminSessionRepositoryError>;
}

/// Fixture implementation that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureAdminSessionRepository;

#[async_trait]
impl AdminSessionRepository for FixtureAdminSessionRepository {
    async fn insert(&self, _session: &AdminSession) -> Result<(), AdminSessionRepositoryError> {
        Ok(())
    }

    async fn find_by_digest(
        &self,
        _token_digest: &str,
    ) -> Result<Option<AdminSession>, AdminSessionRepositoryError> {
        Ok(None)
    }

    async fn delete_by_digest(
        &self,
        _token_digest: &str,
    ) -> Result<(), AdminSessionRepositoryError> {
        Ok(())
    }
}
