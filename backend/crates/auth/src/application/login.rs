//! Login Use Case
//!
//! Authenticates a principal by email and password and opens a session,
//! replacing any session the principal already had.

use std::sync::{Arc, LazyLock};

use platform::crypto;

use crate::application::config::AuthConfig;
use crate::application::tokens::{AuthOutput, UserSummary, issue_pair};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::services::TokenCodec;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
};
use crate::error::{AuthError, AuthResult};

/// Hash of a random secret nobody knows. Unknown emails are verified
/// against it so they cost the same Argon2 work as a wrong password.
static UNKNOWN_USER_HASH: LazyLock<Option<UserPassword>> = LazyLock::new(|| {
    let raw = RawPassword::new(crypto::to_base64url(&crypto::random_bytes(24))).ok()?;
    UserPassword::from_raw(&raw, None).ok()
});

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login use case
pub struct LoginUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S> LoginUseCase<U, S>
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

    pub async fn execute(&self, input: LoginInput) -> AuthResult<AuthOutput> {
        // Unknown and malformed emails look the same as a wrong password
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some(user) = self.user_repo.find_by_email(&email).await? else {
            if let Some(decoy) = UNKNOWN_USER_HASH.as_ref() {
                self.verify_password(decoy.clone(), input.password).await?;
            }
            return Err(AuthError::InvalidCredentials);
        };

        if !user.can_login() {
            return Err(AuthError::AccountInactive);
        }

        if !self
            .verify_password(user.password_hash.clone(), input.password)
            .await?
        {
            return Err(AuthError::InvalidCredentials);
        }

        let tokens = issue_pair(&self.codec, &self.config, user.user_id, user.user_role)?;
        self.session_repo
            .store(
                &user.user_id,
                &tokens.refresh_token,
                self.config.refresh_token_ttl,
            )
            .await?;

        tracing::info!(user_id = %user.user_id, role = %user.user_role, "User logged in");

        Ok(AuthOutput {
            tokens,
            user: UserSummary::from(&user),
        })
    }

    /// Argon2 verification on the blocking pool; a password that fails the
    /// policy simply does not match
    async fn verify_password(&self, hash: UserPassword, password: String) -> AuthResult<bool> {
        let Ok(raw_password) = RawPassword::new(password) else {
            return Ok(false);
        };
        let pepper = self.config.password_pepper.clone();
        tokio::task::spawn_blocking(move || hash.verify(&raw_password, pepper.as_deref()))
            .await
            .map_err(|e| AuthError::Internal(format!("Password verification task failed: {e}")))
    }
}
