//! PostgreSQL-backed `AdminSessionRepository` implementation.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::AdminSession;
use crate::domain::ports::{AdminSessionRepository, AdminSessionRepositoryError};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::AdminSessionRow;
use super::pool::{DbPool, PoolError};
use super::schema::admin_sessions;

/// Diesel-backed implementation of the admin session repository port.
#[derive(Clone)]
pub struct DieselAdminSessionRepository {
    pool: DbPool,
}

impl DieselAdminSessionRepository {
    /// Create a repository backed by `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AdminSessionRepositoryError {
    map_basic_pool_error(error, AdminSessionRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AdminSessionRepositoryError {
    map_basic_diesel_error(
        error,
        AdminSessionRepositoryError::query,
        AdminSessionRepositoryError::connection,
    )
}

impl From<&AdminSession> for AdminSessionRow {
    fn from(session: &AdminSession) -> Self {
        Self {
            token_digest: session.token_digest.clone(),
            username: session.username.clone(),
            created_at: session.created_at,
            expires_at: session.expires_at,
        }
    }
}

impl From<AdminSessionRow> for AdminSession {
    fn from(row: AdminSessionRow) -> Self {
        Self {
            token_digest: row.token_digest,
            username: row.username,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

#[async_trait]
impl AdminSessionRepository for DieselAdminSessionRepository {
    async fn insert(&self, session: &AdminSession) -> Result<(), AdminSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(admin_sessions::table)
            .values(AdminSessionRow::from(session))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }

    async fn find_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<AdminSession>, AdminSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = admin_sessions::table
            .find(token_digest)
            .select(AdminSessionRow::as_select())
            .first::<AdminSessionRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(AdminSession::from))
    }

    async fn delete_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<(), AdminSessionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::delete(admin_sessions::table.find(token_digest))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn rows_round_trip_through_the_domain_type() {
        let created_at = Utc::now();
        let session = AdminSession {
            token_digest: "ab".repeat(32),
            username: "doctor".to_owned(),
            created_at,
            expires_at: created_at + TimeDelta::hours(24),
        };

        let row = AdminSessionRow::from(&session);
        assert_eq!(row.token_digest.len(), 64);
        assert_eq!(AdminSession::from(row), session);
    }
}
