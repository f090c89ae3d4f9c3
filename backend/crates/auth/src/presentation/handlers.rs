//! HTTP Handlers

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    CurrentUserUseCase, LoginInput, LoginUseCase, LogoutUseCase, RefreshTokenUseCase,
    RegisterInput, RegisterUseCase, RevokeSessionUseCase,
};
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::services::TokenCodec;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AuthResponse, CurrentUserResponse, LoginRequest, RefreshTokenRequest, RegisterRequest,
    TokenResponse,
};
use crate::presentation::middleware::CurrentPrincipal;

/// Shared state for auth handlers
pub struct AuthAppState<U, S> {
    pub users: Arc<U>,
    pub sessions: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

impl<U, S> AuthAppState<U, S> {
    pub fn new(users: U, sessions: S, codec: TokenCodec, config: AuthConfig) -> Self {
        Self {
            users: Arc::new(users),
            sessions: Arc::new(sessions),
            codec: Arc::new(codec),
            config: Arc::new(config),
        }
    }
}

impl<U, S> Clone for AuthAppState<U, S> {
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

// ============================================================================
// Register
// ============================================================================

/// POST /api/auth/register
pub async fn register<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<RegisterRequest>,
) -> AuthResult<(StatusCode, Json<AuthResponse>)>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let use_case = RegisterUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let input = RegisterInput {
        email: req.email,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let output = use_case.execute(input).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

// ============================================================================
// Login
// ============================================================================

/// POST /api/auth/login
pub async fn login<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<AuthResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let use_case = LoginUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let output = use_case
        .execute(LoginInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(Json(output.into()))
}

// ============================================================================
// Refresh
// ============================================================================

/// POST /api/auth/refresh
pub async fn refresh<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<RefreshTokenRequest>,
) -> AuthResult<Json<TokenResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let use_case = RefreshTokenUseCase::new(
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let tokens = use_case.execute(&req.refresh_token).await?;

    Ok(Json(tokens.into()))
}

// ============================================================================
// Authenticated routes
// ============================================================================

/// POST /api/auth/logout
pub async fn logout<U, S>(
    State(state): State<AuthAppState<U, S>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> AuthResult<StatusCode>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    LogoutUseCase::new(state.sessions.clone())
        .execute(&principal.user_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me<U, S>(
    State(state): State<AuthAppState<U, S>>,
    CurrentPrincipal(principal): CurrentPrincipal,
) -> AuthResult<Json<CurrentUserResponse>>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let output = CurrentUserUseCase::new(state.users.clone(), state.sessions.clone())
        .execute(&principal.user_id)
        .await?;

    Ok(Json(output.into()))
}

/// DELETE /api/auth/sessions/{user_id}
pub async fn revoke_session<U, S>(
    State(state): State<AuthAppState<U, S>>,
    CurrentPrincipal(principal): CurrentPrincipal,
    Path(user_id): Path<String>,
) -> AuthResult<StatusCode>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let target: UserId = user_id
        .parse()
        .map_err(|_| AuthError::Validation(format!("invalid user id: {user_id}")))?;

    RevokeSessionUseCase::new(state.users.clone(), state.sessions.clone())
        .execute(&principal.user_id, &target)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
