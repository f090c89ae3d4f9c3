//! Current User Use Case
//!
//! Profile of the authenticated principal and whether it still holds a
//! refresh session.

use std::sync::Arc;

use crate::application::tokens::UserSummary;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Current user output
#[derive(Debug, Clone)]
pub struct CurrentUserOutput {
    pub user: UserSummary,
    /// False after logout even though the access token is still valid
    pub session_active: bool,
}

/// Current user use case
pub struct CurrentUserUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
}

impl<U, S> CurrentUserUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(user_repo: Arc<U>, session_repo: Arc<S>) -> Self {
        Self {
            user_repo,
            session_repo,
        }
    }

    pub async fn execute(&self, user_id: &UserId) -> AuthResult<CurrentUserOutput> {
        let user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let session_active = self.session_repo.exists(user_id).await?;

        Ok(CurrentUserOutput {
            user: UserSummary::from(&user),
            session_active,
        })
    }
}
