//! Token pair issuance shared by register, login and refresh.

use crate::application::config::AuthConfig;
use crate::domain::entity::user::User;
use crate::domain::services::TokenCodec;
use crate::domain::value_object::{
    token_kind::TokenKind, user_id::UserId, user_role::UserRole,
};
use crate::error::AuthResult;

/// Freshly minted access + refresh tokens
#[derive(Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}

/// Public view of a principal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            email: user.email.to_string(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.user_role,
        }
    }
}

/// Result of register and login
#[derive(Debug, Clone)]
pub struct AuthOutput {
    pub tokens: TokenPair,
    pub user: UserSummary,
}

pub(crate) fn issue_pair(
    codec: &TokenCodec,
    config: &AuthConfig,
    user_id: UserId,
    role: UserRole,
) -> AuthResult<TokenPair> {
    let access_token = codec.mint(user_id, role, TokenKind::Access, config.access_lifetime()?)?;
    let refresh_token =
        codec.mint(user_id, role, TokenKind::Refresh, config.refresh_lifetime()?)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
