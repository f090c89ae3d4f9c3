//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::bearer::BearerError;
use platform::kv::KvError;
use thiserror::Error;

use crate::domain::services::TokenError;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a request could not be authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UnauthenticatedReason {
    #[error("authorization header is required")]
    MissingHeader,

    #[error("invalid authorization header format")]
    MalformedHeader,

    #[error("unsupported authorization type")]
    UnsupportedScheme,

    #[error("invalid access token")]
    InvalidToken,

    #[error("access token has expired")]
    TokenExpired,

    #[error("invalid token type")]
    WrongTokenKind,

    /// Role check ran without a preceding access check
    #[error("authentication required")]
    MissingIdentity,
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("account is inactive")]
    AccountInactive,

    #[error("email already exists")]
    EmailExists,

    /// Refresh credential failed verification, was revoked or was rotated away
    #[error("invalid refresh token")]
    InvalidRefreshToken,

    #[error("{0}")]
    Unauthenticated(UnauthenticatedReason),

    #[error("insufficient permissions")]
    Forbidden,

    #[error("user not found")]
    UserNotFound,

    /// No live session record for the principal
    #[error("session not found or expired")]
    SessionNotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidCredentials
            | AuthError::InvalidRefreshToken
            | AuthError::Unauthenticated(_)
            | AuthError::SessionNotFound => ErrorKind::Unauthorized,
            AuthError::AccountInactive | AuthError::Forbidden => ErrorKind::Forbidden,
            AuthError::EmailExists => ErrorKind::Conflict,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Validation(_) => ErrorKind::BadRequest,
            AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    ///
    /// Internal details stay in the logs.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::Internal(_) => AppError::internal("internal server error"),
            AuthError::Unauthenticated(UnauthenticatedReason::TokenExpired) => {
                AppError::new(self.kind(), self.to_string())
                    .with_action("Refresh the access token and retry")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountInactive => {
                tracing::warn!("Login attempt on inactive account");
            }
            AuthError::InvalidRefreshToken => {
                tracing::warn!("Rejected refresh token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        match err.kind() {
            ErrorKind::BadRequest => AuthError::Validation(err.message().to_string()),
            _ => AuthError::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid => AuthError::Unauthenticated(UnauthenticatedReason::InvalidToken),
            TokenError::Expired => AuthError::Unauthenticated(UnauthenticatedReason::TokenExpired),
            TokenError::WrongKind => {
                AuthError::Unauthenticated(UnauthenticatedReason::WrongTokenKind)
            }
            TokenError::Encode(_)
            | TokenError::LifetimeOutOfRange
            | TokenError::InvalidKeyLength(_) => {
                AuthError::Internal(err.to_string())
            }
        }
    }
}

impl From<BearerError> for AuthError {
    fn from(err: BearerError) -> Self {
        let reason = match err {
            BearerError::Missing => UnauthenticatedReason::MissingHeader,
            BearerError::Malformed => UnauthenticatedReason::MalformedHeader,
            BearerError::UnsupportedScheme => UnauthenticatedReason::UnsupportedScheme,
        };
        AuthError::Unauthenticated(reason)
    }
}

impl From<KvError> for AuthError {
    fn from(err: KvError) -> Self {
        AuthError::Internal(err.to_string())
    }
}
