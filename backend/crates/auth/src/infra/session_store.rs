//! Key-Value Session Store
//!
//! Refresh sessions in a key-value backend under `refresh_token:{user_id}`.
//! The backend's TTL decides when a session expires.

use std::sync::Arc;
use std::time::Duration;

use platform::kv::KeyValueStore;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Key prefix for refresh session records
pub const SESSION_KEY_PREFIX: &str = "refresh_token:";

pub struct KvSessionStore<K> {
    kv: Arc<K>,
}

impl<K> Clone for KvSessionStore<K> {
    fn clone(&self) -> Self {
        Self {
            kv: Arc::clone(&self.kv),
        }
    }
}

impl<K> KvSessionStore<K>
where
    K: KeyValueStore + Send + Sync,
{
    pub fn new(kv: Arc<K>) -> Self {
        Self { kv }
    }

    pub fn session_key(user_id: &UserId) -> String {
        format!("{}{}", SESSION_KEY_PREFIX, user_id)
    }
}

impl<K> SessionRepository for KvSessionStore<K>
where
    K: KeyValueStore + Send + Sync,
{
    async fn store(&self, user_id: &UserId, token: &str, ttl: Duration) -> AuthResult<()> {
        self.kv
            .set_with_ttl(&Self::session_key(user_id), token, ttl)
            .await?;
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> AuthResult<String> {
        self.kv
            .get(&Self::session_key(user_id))
            .await?
            .ok_or(AuthError::SessionNotFound)
    }

    async fn delete(&self, user_id: &UserId) -> AuthResult<()> {
        self.kv.delete(&Self::session_key(user_id)).await?;
        Ok(())
    }

    async fn exists(&self, user_id: &UserId) -> AuthResult<bool> {
        Ok(self.kv.exists(&Self::session_key(user_id)).await?)
    }

    async fn replace_if_current(
        &self,
        user_id: &UserId,
        expected: &str,
        new_token: &str,
        ttl: Duration,
    ) -> AuthResult<bool> {
        Ok(self
            .kv
            .compare_and_set(&Self::session_key(user_id), expected, new_token, ttl)
            .await?)
    }
}
