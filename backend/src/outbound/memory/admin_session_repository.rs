//! In-memory admin session store.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::AdminSession;
use crate::domain::ports::{AdminSessionRepository, AdminSessionRepositoryError};

/// Admin sessions keyed by token digest.
#[derive(Debug, Default)]
pub struct InMemoryAdminSessionRepository {
    sessions: Mutex<HashMap<String, AdminSession>>,
}

impl InMemoryAdminSessionRepository {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(
        &self,
    ) -> Result<MutexGuard<'_, HashMap<String, AdminSession>>, AdminSessionRepositoryError> {
        self.sessions
            .lock()
            .map_err(|_| AdminSessionRepositoryError::query("admin session store lock poisoned"))
    }
}

#[async_trait]
impl AdminSessionRepository for InMemoryAdminSessionRepository {
    async fn insert(&self, session: &AdminSession) -> Result<(), AdminSessionRepositoryError> {
        self.lock()?
            .insert(session.token_digest.clone(), session.clone());
        Ok(())
    }

    async fn find_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<Option<AdminSession>, AdminSessionRepositoryError> {
        Ok(self.lock()?.get(token_digest).cloned())
    }

    async fn delete_by_digest(
        &self,
        token_digest: &str,
    ) -> Result<(), AdminSessionRepositoryError> {
        self.lock()?.remove(token_digest);
        Ok(())
    }
}
