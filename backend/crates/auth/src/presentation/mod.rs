//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::AuthAppState;
pub use middleware::{
    AllowedRoles, CurrentPrincipal, authenticate, authorize, require_access_token, require_roles,
};
pub use router::auth_router;
