//! Cryptographic Utilities

use std::fmt;

use base64::{Engine, engine::general_purpose};
use chacha20poly1305::{
    KeyInit, XChaCha20Poly1305, XNonce,
    aead::{Aead, Payload},
};
use rand::{RngCore, rngs::OsRng};
use thiserror::Error;

/// Symmetric key length for [`SealingKey`]
pub const SEALING_KEY_LENGTH: usize = 32;

/// XChaCha20 extended nonce length
pub const NONCE_LENGTH: usize = 24;

/// Poly1305 authentication tag length
pub const TAG_LENGTH: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("Sealing key must be exactly {expected} bytes (got {actual})")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Sealed data is too short")]
    Truncated,

    /// Wrong key, tampered ciphertext or mismatched associated data
    #[error("Sealed data failed authentication")]
    Unauthenticated,

    #[error("Encryption failed")]
    SealFailed,
}

/// Generate cryptographically secure random bytes
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// Encode bytes as base64
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode base64 to bytes
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// Encode bytes as URL-safe base64 without padding
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Decode URL-safe base64 without padding
pub fn from_base64url(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::URL_SAFE_NO_PAD.decode(s)
}

/// Constant-time comparison to prevent timing attacks
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}

// ============================================================================
// Authenticated encryption (XChaCha20-Poly1305)
// ============================================================================

/// 32-byte symmetric key for authenticated encryption
///
/// Sealed output layout: `nonce (24 bytes) || ciphertext || tag (16 bytes)`.
/// A fresh random nonce is drawn for every call to [`SealingKey::seal`].
#[derive(Clone)]
pub struct SealingKey {
    cipher: XChaCha20Poly1305,
}

impl SealingKey {
    pub fn new(key: &[u8]) -> Result<Self, CryptoError> {
        if key.len() != SEALING_KEY_LENGTH {
            return Err(CryptoError::InvalidKeyLength {
                expected: SEALING_KEY_LENGTH,
                actual: key.len(),
            });
        }

        let cipher = XChaCha20Poly1305::new_from_slice(key).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: SEALING_KEY_LENGTH,
                actual: key.len(),
            }
        })?;

        Ok(Self { cipher })
    }

    /// Encrypt and authenticate `plaintext`, binding `aad` to the output
    pub fn seal(&self, aad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let nonce_bytes = random_bytes(NONCE_LENGTH);
        let nonce = XNonce::from_slice(&nonce_bytes);

        let ciphertext = self
            .cipher
            .encrypt(
                nonce,
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::SealFailed)?;

        let mut sealed = Vec::with_capacity(NONCE_LENGTH + ciphertext.len());
        sealed.extend_from_slice(&nonce_bytes);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Authenticate and decrypt output of [`SealingKey::seal`]
    pub fn open(&self, aad: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if sealed.len() < NONCE_LENGTH + TAG_LENGTH {
            return Err(CryptoError::Truncated);
        }

        let (nonce_bytes, ciphertext) = sealed.split_at(NONCE_LENGTH);
        let nonce = XNonce::from_slice(nonce_bytes);

        self.cipher
            .decrypt(
                nonce,
                Payload {
                    msg: ciphertext,
                    aad,
                },
            )
            .map_err(|_| CryptoError::Unauthenticated)
    }
}

impl fmt::Debug for SealingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SealingKey")
            .field("key", &"[REDACTED]")
            .finish()
    }
}
