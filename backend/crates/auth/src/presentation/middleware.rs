//! Auth Middleware
//!
//! Access guard and role guard for protected routes.
//!
//! The access guard verifies the bearer token and stores the decoded
//! [`CredentialPayload`] in request extensions. The role guard runs after it
//! and checks the payload's role. Handlers read the payload through the
//! [`CurrentPrincipal`] extractor.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Request, State};
use axum::http::HeaderMap;
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use platform::bearer::extract_bearer_token;

use crate::domain::entity::credential::CredentialPayload;
use crate::domain::services::TokenCodec;
use crate::domain::value_object::{token_kind::TokenKind, user_role::UserRole};
use crate::error::{AuthError, AuthResult, UnauthenticatedReason};

// ============================================================================
// Access guard
// ============================================================================

/// Verify the request's access token
///
/// No session store lookup happens here: a logged-out principal's access
/// token is accepted until it expires.
pub fn authenticate(codec: &TokenCodec, headers: &HeaderMap) -> AuthResult<CredentialPayload> {
    let token = extract_bearer_token(headers)?;
    let payload = codec.verify(token)?;

    if payload.token_type != TokenKind::Access {
        return Err(AuthError::Unauthenticated(
            UnauthenticatedReason::WrongTokenKind,
        ));
    }

    Ok(payload)
}

/// Middleware that requires a valid access token
pub async fn require_access_token(
    State(codec): State<Arc<TokenCodec>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let payload = authenticate(&codec, req.headers())?;

    tracing::debug!(user_id = %payload.user_id, role = %payload.role, "Access token accepted");

    req.extensions_mut().insert(payload);
    Ok(next.run(req).await)
}

// ============================================================================
// Role guard
// ============================================================================

/// Roles permitted on a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowedRoles(&'static [UserRole]);

impl AllowedRoles {
    pub const ADMIN_ONLY: AllowedRoles = AllowedRoles(&[UserRole::Admin]);
    pub const ANY_AUTHENTICATED: AllowedRoles = AllowedRoles(&UserRole::ALL);

    pub const fn new(roles: &'static [UserRole]) -> Self {
        Self(roles)
    }

    pub fn permits(&self, role: UserRole) -> bool {
        self.0.contains(&role)
    }
}

/// Check the decoded identity against `allowed`
pub fn authorize(payload: Option<&CredentialPayload>, allowed: AllowedRoles) -> AuthResult<()> {
    let payload = payload.ok_or(AuthError::Unauthenticated(
        UnauthenticatedReason::MissingIdentity,
    ))?;

    if !allowed.permits(payload.role) {
        tracing::warn!(
            user_id = %payload.user_id,
            role = %payload.role,
            "Role not permitted on route"
        );
        return Err(AuthError::Forbidden);
    }

    Ok(())
}

/// Middleware that requires one of the allowed roles
///
/// Must be layered inside [`require_access_token`].
pub async fn require_roles(
    State(allowed): State<AllowedRoles>,
    req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    authorize(req.extensions().get::<CredentialPayload>(), allowed)?;
    Ok(next.run(req).await)
}

// ============================================================================
// Extractor
// ============================================================================

/// Decoded identity of the authenticated caller
#[derive(Debug, Clone)]
pub struct CurrentPrincipal(pub CredentialPayload);

impl<St> FromRequestParts<St> for CurrentPrincipal
where
    St: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &St) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CredentialPayload>()
            .cloned()
            .map(CurrentPrincipal)
            .ok_or(AuthError::Unauthenticated(
                UnauthenticatedReason::MissingIdentity,
            ))
    }
}
