//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, credential codec, repository traits
//! - `application/` - Use cases and application services
//! - `infra/` - Repository implementations
//! - `presentation/` - HTTP handlers, DTOs, guards, router
//!
//! ## Features
//! - Registration and login with email + password
//! - Short-lived access tokens and long-lived, rotating refresh tokens
//! - One revocable refresh session per principal
//! - Role-based route guards (`USER`, `ADMIN`)
//!
//! ## Security Model
//! - Tokens are XChaCha20-Poly1305 sealed payloads under one 32-byte key
//! - Passwords hashed with Argon2id, optional pepper
//! - Refresh rotation is compare-and-swap, so a refresh token works once
//! - Access tokens are not checked against the session store

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use domain::services::{TokenCodec, TokenError};
pub use error::{AuthError, AuthResult, UnauthenticatedReason};
pub use infra::{InMemoryUserRepository, KvSessionStore};
pub use presentation::handlers::AuthAppState;
pub use presentation::router::auth_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
