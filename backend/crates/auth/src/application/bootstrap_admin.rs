//! Bootstrap Admin Use Case
//!
//! Seeds the first `ADMIN` principal at startup. Nothing else can grant the
//! role, so without this the admin-only routes are unreachable.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::tokens::UserSummary;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email,
    user_password::{RawPassword, UserPassword},
    user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

pub struct BootstrapAdminInput {
    pub email: String,
    pub password: String,
}

pub struct BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> BootstrapAdminUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Create the admin unless the email is already taken
    ///
    /// An existing principal is returned as is; its role is not changed.
    pub async fn execute(&self, input: BootstrapAdminInput) -> AuthResult<UserSummary> {
        let email = Email::new(input.email)?;

        if let Some(existing) = self.user_repo.find_by_email(&email).await? {
            if !existing.user_role.is_admin() {
                tracing::warn!(
                    user_id = %existing.user_id,
                    "Bootstrap admin email belongs to a non-admin principal"
                );
            }
            return Ok(UserSummary::from(&existing));
        }

        let raw_password = RawPassword::new(input.password)?;
        let pepper = self.config.password_pepper.clone();
        let password_hash = tokio::task::spawn_blocking(move || {
            UserPassword::from_raw(&raw_password, pepper.as_deref())
        })
        .await
        .map_err(|e| AuthError::Internal(format!("Password hashing task failed: {e}")))??;

        let admin = User::new(email, password_hash, "Admin", "").with_role(UserRole::Admin);
        self.user_repo.create(&admin).await?;

        tracing::info!(user_id = %admin.user_id, "Bootstrap admin created");

        Ok(UserSummary::from(&admin))
    }
}
