//! Logout Use Case
//!
//! Ends the principal's refresh session. Access tokens already issued stay
//! valid until they expire.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::AuthResult;

/// Logout use case
pub struct LogoutUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
}

impl<S> LogoutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Idempotent
    pub async fn execute(&self, user_id: &UserId) -> AuthResult<()> {
        self.session_repo.delete(user_id).await?;

        tracing::info!(user_id = %user_id, "User logged out");
        Ok(())
    }
}
