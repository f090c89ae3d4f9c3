//! Domain Services
//!
//! Credential codec: mints and verifies self-contained, encrypted tokens.
//!
//! Token layout:
//! ```text
//! v1.local.<base64url( nonce || ciphertext || tag )>
//! ```
//! The plaintext is the JSON-encoded [`CredentialPayload`]; the header is
//! bound to the ciphertext as associated data.

use chrono::Utc;
use platform::crypto::{self, SealingKey};
use thiserror::Error;

use crate::domain::entity::credential::CredentialPayload;
use crate::domain::value_object::{token_kind::TokenKind, user_id::UserId, user_role::UserRole};

/// Version and purpose prefix of every token
pub const TOKEN_HEADER: &str = "v1.local.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Malformed, tampered, sealed under another key, or not a payload
    #[error("token is invalid")]
    Invalid,

    #[error("token has expired")]
    Expired,

    #[error("token is of the wrong kind")]
    WrongKind,

    #[error("failed to encode token: {0}")]
    Encode(String),

    #[error("token lifetime out of range")]
    LifetimeOutOfRange,

    #[error("token key must be exactly {expected} bytes (got {0})", expected = crypto::SEALING_KEY_LENGTH)]
    InvalidKeyLength(usize),
}

/// Credential codec bound to one process-wide symmetric key
///
/// Verification is pure: it never consults the session store, so a valid
/// access token stays usable until it expires.
#[derive(Debug, Clone)]
pub struct TokenCodec {
    key: SealingKey,
}

impl TokenCodec {
    /// Fails unless `key` is exactly 32 bytes
    pub fn new(key: &[u8]) -> Result<Self, TokenError> {
        let key = SealingKey::new(key).map_err(|_| TokenError::InvalidKeyLength(key.len()))?;
        Ok(Self { key })
    }

    /// Mint a token valid for `lifetime` from now
    ///
    /// A negative lifetime produces a token that is already expired.
    pub fn mint(
        &self,
        user_id: UserId,
        role: UserRole,
        kind: TokenKind,
        lifetime: chrono::Duration,
    ) -> Result<String, TokenError> {
        let payload = CredentialPayload::new(user_id, role, kind, Utc::now(), lifetime)
            .ok_or(TokenError::LifetimeOutOfRange)?;
        self.seal(&payload)
    }

    fn seal(&self, payload: &CredentialPayload) -> Result<String, TokenError> {
        let plaintext =
            serde_json::to_vec(payload).map_err(|e| TokenError::Encode(e.to_string()))?;

        let sealed = self
            .key
            .seal(TOKEN_HEADER.as_bytes(), &plaintext)
            .map_err(|e| TokenError::Encode(e.to_string()))?;

        Ok(format!("{}{}", TOKEN_HEADER, crypto::to_base64url(&sealed)))
    }

    /// Authenticate, decrypt and check expiry
    ///
    /// Expiry is only checked once the token has authenticated, so a forged
    /// token is always `Invalid`, never `Expired`.
    pub fn verify(&self, token: &str) -> Result<CredentialPayload, TokenError> {
        let body = token
            .strip_prefix(TOKEN_HEADER)
            .ok_or(TokenError::Invalid)?;

        let sealed = crypto::from_base64url(body).map_err(|_| TokenError::Invalid)?;

        let plaintext = self
            .key
            .open(TOKEN_HEADER.as_bytes(), &sealed)
            .map_err(|_| TokenError::Invalid)?;

        let payload: CredentialPayload =
            serde_json::from_slice(&plaintext).map_err(|_| TokenError::Invalid)?;

        if payload.is_expired_at(Utc::now()) {
            return Err(TokenError::Expired);
        }

        Ok(payload)
    }

    /// [`TokenCodec::verify`] plus a check of the token's kind
    pub fn verify_kind(
        &self,
        token: &str,
        expected: TokenKind,
    ) -> Result<CredentialPayload, TokenError> {
        let payload = self.verify(token)?;
        if payload.token_type != expected {
            return Err(TokenError::WrongKind);
        }
        Ok(payload)
    }
}
