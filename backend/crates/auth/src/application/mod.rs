//! Application Layer
//!
//! Use cases and application services.

pub mod bootstrap_admin;
pub mod config;
pub mod current_user;
pub mod login;
pub mod logout;
pub mod refresh_token;
pub mod register;
pub mod revoke_session;
pub mod tokens;

// Re-exports
pub use bootstrap_admin::{BootstrapAdminInput, BootstrapAdminUseCase};
pub use config::AuthConfig;
pub use current_user::{CurrentUserOutput, CurrentUserUseCase};
pub use login::{LoginInput, LoginUseCase};
pub use logout::LogoutUseCase;
pub use refresh_token::RefreshTokenUseCase;
pub use register::{RegisterInput, RegisterUseCase};
pub use revoke_session::RevokeSessionUseCase;
pub use tokens::{AuthOutput, TokenPair, UserSummary};
