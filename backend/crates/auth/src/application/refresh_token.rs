//! Refresh Token Use Case
//!
//! Exchanges the principal's current refresh token for a new pair and
//! retires the presented one.

use std::sync::Arc;

use platform::crypto::constant_time_eq;

use crate::application::config::AuthConfig;
use crate::application::tokens::{TokenPair, issue_pair};
use crate::domain::repository::SessionRepository;
use crate::domain::services::TokenCodec;
use crate::domain::value_object::token_kind::TokenKind;
use crate::error::{AuthError, AuthResult};

/// Refresh token use case
pub struct RefreshTokenUseCase<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<S> RefreshTokenUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            codec,
            config,
        }
    }

    /// Every rejection is reported as `InvalidRefreshToken`; the cause is
    /// only logged.
    pub async fn execute(&self, presented: &str) -> AuthResult<TokenPair> {
        let payload = self
            .codec
            .verify_kind(presented, TokenKind::Refresh)
            .map_err(|e| {
                tracing::debug!(error = %e, "Refresh token failed verification");
                AuthError::InvalidRefreshToken
            })?;

        let stored = match self.session_repo.get(&payload.user_id).await {
            Ok(stored) => stored,
            Err(AuthError::SessionNotFound) => {
                tracing::debug!(user_id = %payload.user_id, "No live session for refresh token");
                return Err(AuthError::InvalidRefreshToken);
            }
            Err(e) => return Err(e),
        };

        if !constant_time_eq(stored.as_bytes(), presented.as_bytes()) {
            tracing::warn!(
                user_id = %payload.user_id,
                "Refresh token does not match the current session"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        let tokens = issue_pair(&self.codec, &self.config, payload.user_id, payload.role)?;

        // Only one of several concurrent refreshes with the same token wins
        let rotated = self
            .session_repo
            .replace_if_current(
                &payload.user_id,
                presented,
                &tokens.refresh_token,
                self.config.refresh_token_ttl,
            )
            .await?;

        if !rotated {
            tracing::warn!(
                user_id = %payload.user_id,
                "Refresh token was rotated or revoked concurrently"
            );
            return Err(AuthError::InvalidRefreshToken);
        }

        tracing::info!(user_id = %payload.user_id, "Refresh token rotated");

        Ok(tokens)
    }
}
