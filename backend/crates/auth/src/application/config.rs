//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use crate::error::{AuthError, AuthResult};

/// Default access token lifetime (15 minutes)
pub const DEFAULT_ACCESS_TOKEN_TTL: Duration = Duration::from_secs(15 * 60);

/// Default refresh token lifetime (168 hours)
pub const DEFAULT_REFRESH_TOKEN_TTL: Duration = Duration::from_secs(168 * 3600);

/// Upper bound for either token lifetime (ten years)
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(3650 * 24 * 3600);

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Symmetric token key (must be 32 bytes). Empty by default, so a codec
    /// built from an unconfigured `AuthConfig` fails at startup.
    pub token_secret: Vec<u8>,
    /// Access token lifetime
    pub access_token_ttl: Duration,
    /// Refresh token lifetime, also the session record TTL
    pub refresh_token_ttl: Duration,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: Vec::new(),
            access_token_ttl: DEFAULT_ACCESS_TOKEN_TTL,
            refresh_token_ttl: DEFAULT_REFRESH_TOKEN_TTL,
            password_pepper: None,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("password_pepper", &self.password_pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl AuthConfig {
    /// Create config with a random token secret (for development)
    ///
    /// Tokens do not survive a restart.
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(platform::crypto::SEALING_KEY_LENGTH),
            ..Default::default()
        }
    }

    /// Get password pepper as slice
    pub fn pepper(&self) -> Option<&[u8]> {
        self.password_pepper.as_deref()
    }

    pub fn access_lifetime(&self) -> AuthResult<chrono::Duration> {
        lifetime(self.access_token_ttl, "access")
    }

    pub fn refresh_lifetime(&self) -> AuthResult<chrono::Duration> {
        lifetime(self.refresh_token_ttl, "refresh")
    }

    /// Both lifetimes are usable for minting
    pub fn validate(&self) -> AuthResult<()> {
        self.access_lifetime()?;
        self.refresh_lifetime()?;
        Ok(())
    }
}

fn lifetime(ttl: Duration, which: &str) -> AuthResult<chrono::Duration> {
    if ttl.is_zero() || ttl > MAX_TOKEN_TTL {
        return Err(AuthError::Internal(format!(
            "{which} token TTL must be between 1s and {}s, got {}s",
            MAX_TOKEN_TTL.as_secs(),
            ttl.as_secs()
        )));
    }
    chrono::Duration::from_std(ttl)
        .map_err(|e| AuthError::Internal(format!("Invalid {which} token TTL: {e}")))
}
