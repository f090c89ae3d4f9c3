//! Top-level router: health check, `/api` nesting and global middleware

use std::any::Any;

use auth::domain::repository::{SessionRepository, UserRepository};
use auth::{AuthAppState, auth_router};
use axum::{
    Json, Router,
    http::{self, Method, header},
    response::{IntoResponse, Response},
    routing::get,
};
use kernel::error::app_error::AppError;
use serde_json::{Value, json};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;

pub fn app<U, S>(state: AuthAppState<U, S>, frontend_origins: &[String]) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionRepository + Send + Sync + 'static,
{
    let router = Router::new()
        .route("/health", get(health))
        .nest("/api", auth_router(state));

    with_middleware(router, frontend_origins)
}

/// GET /health
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn with_middleware(router: Router, frontend_origins: &[String]) -> Router {
    let allowed_origins: Vec<http::HeaderValue> = frontend_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::DELETE,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
        ]));

    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// A panicking handler becomes a plain 500 problem body
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    tracing::error!(panic = %detail, "Request handler panicked");

    AppError::internal("internal server error").into_response()
}
