//! Revoke Session Use Case
//!
//! Administrative logout of another principal.

use std::sync::Arc;

use crate::application::logout::LogoutUseCase;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Revoke session use case
pub struct RevokeSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    logout: LogoutUseCase<S>,
}

impl<U, S> RevokeSessionUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            logout: LogoutUseCase::new(session_repo),
        }
    }

    pub async fn execute(&self, revoked_by: &UserId, target: &UserId) -> AuthResult<()> {
        if self.user_repo.find_by_id(target).await?.is_none() {
            return Err(AuthError::UserNotFound);
        }

        self.logout.execute(target).await?;

        tracing::info!(revoked_by = %revoked_by, user_id = %target, "Session revoked");
        Ok(())
    }
}
