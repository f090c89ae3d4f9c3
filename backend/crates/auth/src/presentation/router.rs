//! Auth Router

use axum::{
    Router, middleware,
    routing::{delete, get, post},
};

use crate::domain::repository::{SessionRepository, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{AllowedRoles, require_access_token, require_roles};

/// Create the Auth router
///
/// | route                          | guard                   |
/// |--------------------------------|-------------------------|
/// | `POST /auth/register`          | none                    |
/// | `POST /auth/login`             | none                    |
/// | `POST /auth/refresh`           | none                    |
/// | `POST /auth/logout`            | access token            |
/// | `GET /auth/me`                 | access token, any role  |
/// | `DELETE /auth/sessions/{id}`   | access token, admin     |
pub fn auth_router<U, S>(state: AuthAppState<U, S>) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let members = Router::new()
        .route("/auth/me", get(handlers::me::<U, S>))
        .route_layer(middleware::from_fn_with_state(
            AllowedRoles::ANY_AUTHENTICATED,
            require_roles,
        ));

    let admins = Router::new()
        .route(
            "/auth/sessions/{user_id}",
            delete(handlers::revoke_session::<U, S>),
        )
        .route_layer(middleware::from_fn_with_state(
            AllowedRoles::ADMIN_ONLY,
            require_roles,
        ));

    // Layers added last run first: access check, then role check
    let protected = Router::new()
        .route("/auth/logout", post(handlers::logout::<U, S>))
        .merge(members)
        .merge(admins)
        .route_layer(middleware::from_fn_with_state(
            state.codec.clone(),
            require_access_token,
        ));

    Router::new()
        .route("/auth/register", post(handlers::register::<U, S>))
        .route("/auth/login", post(handlers::login::<U, S>))
        .route("/auth/refresh", post(handlers::refresh::<U, S>))
        .merge(protected)
        .with_state(state)
}
