//! User Entity
//!
//! Principal record owned by the user profile subsystem. Authentication reads
//! it and only ever creates it on registration.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_password::UserPassword, user_role::UserRole,
};

#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, normalized login identifier
    pub email: Email,
    pub password_hash: UserPassword,
    pub first_name: String,
    pub last_name: String,
    pub user_role: UserRole,
    /// Inactive principals cannot log in
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create an active `USER` principal
    pub fn new(
        email: Email,
        password_hash: UserPassword,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            email,
            password_hash,
            first_name: first_name.into(),
            last_name: last_name.into(),
            user_role: UserRole::default(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_role(mut self, role: UserRole) -> Self {
        self.user_role = role;
        self.updated_at = Utc::now();
        self
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }
}
