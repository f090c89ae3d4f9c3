//! Credential Payload
//!
//! Claims sealed inside every access and refresh token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_object::{token_kind::TokenKind, user_id::UserId, user_role::UserRole};

/// Decoded token claims
///
/// Built fresh on every mint and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialPayload {
    pub user_id: UserId,
    pub role: UserRole,
    pub token_type: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl CredentialPayload {
    /// Claims valid from `issued_at` for `lifetime`
    ///
    /// A negative lifetime yields claims that are already expired. `None` if
    /// the expiry falls outside the representable date range.
    pub fn new(
        user_id: UserId,
        role: UserRole,
        token_type: TokenKind,
        issued_at: DateTime<Utc>,
        lifetime: chrono::Duration,
    ) -> Option<Self> {
        let expires_at = issued_at.checked_add_signed(lifetime)?;
        Some(Self {
            user_id,
            role,
            token_type,
            issued_at,
            expires_at,
        })
    }

    /// Expired strictly after `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}
