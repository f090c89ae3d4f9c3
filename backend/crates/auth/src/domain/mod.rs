//! Domain Layer
//!
//! Contains entities, value objects, the credential codec and repository
//! traits.

pub mod entity;
pub mod repository;
pub mod services;
pub mod value_object;

// Re-exports
pub use entity::{credential::CredentialPayload, user::User};
pub use repository::{SessionRepository, UserRepository};
pub use services::{TokenCodec, TokenError};
