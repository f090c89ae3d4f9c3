//! Register Use Case
//!
//! Creates a principal and opens its first session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::tokens::{AuthOutput, TokenPair, UserSummary, issue_pair};
use crate::domain::entity::user::User;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::services::TokenCodec;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Register input
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Register use case
pub struct RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S> RegisterUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            session_repo,
            codec,
            config,
        }
    }

    pub async fn execute(&self, input: RegisterInput) -> AuthResult<AuthOutput> {
        // Refuse before the principal exists rather than after
        self.config.validate()?;

        let email = Email::new(input.email)?;

        if self.user_repo.exists_by_email(&email).await? {
            return Err(AuthError::EmailExists);
        }

        let raw_password = RawPassword::new(input.password)?;
        let pepper = self.config.password_pepper.clone();
        let password_hash = tokio::task::spawn_blocking(move || {
            UserPassword::from_raw(&raw_password, pepper.as_deref())
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))??;

        let user = User::new(
            email,
            password_hash,
            input.first_name.trim(),
            input.last_name.trim(),
        );
        self.user_repo.create(&user).await?;

        // The principal is not rolled back if the session cannot be opened;
        // the caller can still log in.
        let tokens = match self.open_session(&user).await {
            Ok(tokens) => tokens,
            Err(e) => {
                tracing::warn!(
                    user_id = %user.user_id,
                    error = %e,
                    "User registered but session could not be opened"
                );
                return Err(e);
            }
        };

        tracing::info!(user_id = %user.user_id, "User registered");

        Ok(AuthOutput {
            tokens,
            user: UserSummary::from(&user),
        })
    }

    async fn open_session(&self, user: &User) -> AuthResult<TokenPair> {
        let tokens = issue_pair(&self.codec, &self.config, user.user_id, user.user_role)?;
        self.session_repo
            .store(
                &user.user_id,
                &tokens.refresh_token,
                self.config.refresh_token_ttl,
            )
            .await?;
        Ok(tokens)
    }
}
