//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use std::time::Duration;

use crate::domain::entity::user::User;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::AuthResult;

/// User repository trait
///
/// Backed by the user profile subsystem.
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user. Fails with `EmailExists` if the email is taken.
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Check if email exists
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;
}

/// Refresh session repository trait
///
/// At most one live refresh token per principal. Writing a new one
/// invalidates whatever was stored before.
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Upsert the principal's refresh token and reset its expiry
    async fn store(&self, user_id: &UserId, token: &str, ttl: Duration) -> AuthResult<()>;

    /// Current refresh token. `SessionNotFound` if absent or expired.
    async fn get(&self, user_id: &UserId) -> AuthResult<String>;

    /// Remove the session. Idempotent.
    async fn delete(&self, user_id: &UserId) -> AuthResult<()>;

    async fn exists(&self, user_id: &UserId) -> AuthResult<bool>;

    /// Swap in `new_token` only if `expected` is still the stored token
    ///
    /// Returns `false` when another rotation or a logout got there first.
    async fn replace_if_current(
        &self,
        user_id: &UserId,
        expected: &str,
        new_token: &str,
        ttl: Duration,
    ) -> AuthResult<bool>;
}
