//! Key-Value Storage Infrastructure
//!
//! String key-value storage where every entry carries its own time-to-live.
//! The backend is the sole authority on expiry: an expired entry is
//! indistinguishable from one that was never written.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::task::JoinHandle;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("Key-value backend unavailable: {0}")]
    Unavailable(String),

    #[error("Key-value backend state is corrupted")]
    Poisoned,
}

pub type KvResult<T> = Result<T, KvError>;

/// Trait for key-value storage backends
#[trait_variant::make(KeyValueStore: Send)]
pub trait LocalKeyValueStore {
    /// Upsert `value` under `key`, replacing any previous value and expiry
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> KvResult<()>;

    /// Live value under `key`, if any
    async fn get(&self, key: &str) -> KvResult<Option<String>>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> KvResult<()>;

    async fn exists(&self, key: &str) -> KvResult<bool>;

    /// Atomically replace the value under `key` only if it currently equals
    /// `expected`. Returns `false` without writing otherwise.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> KvResult<bool>;
}

// ============================================================================
// In-memory backend
// ============================================================================

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory key-value backend
///
/// Expired entries are dropped lazily when touched, and in bulk by
/// [`MemoryKeyValueStore::purge_expired`]. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryKeyValueStore {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> KvResult<MutexGuard<'_, HashMap<String, Entry>>> {
        self.entries.lock().map_err(|_| KvError::Poisoned)
    }

    /// Live entry under `key`, evicting it first if it has expired
    fn live_value<'a>(
        entries: &'a mut HashMap<String, Entry>,
        key: &str,
        now: Instant,
    ) -> Option<&'a str> {
        if entries.get(key).is_some_and(|entry| !entry.is_live(now)) {
            entries.remove(key);
        }
        entries.get(key).map(|entry| entry.value.as_str())
    }

    /// Remove every expired entry. Returns the number removed.
    pub fn purge_expired(&self) -> KvResult<usize> {
        let now = Instant::now();
        let mut entries = self.lock()?;
        let before = entries.len();
        entries.retain(|_, entry| entry.is_live(now));
        Ok(before - entries.len())
    }

    /// Number of live entries
    pub fn len(&self) -> KvResult<usize> {
        let now = Instant::now();
        Ok(self.lock()?.values().filter(|e| e.is_live(now)).count())
    }

    pub fn is_empty(&self) -> KvResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Spawn a background task that purges expired entries every `period`
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                match store.purge_expired() {
                    Ok(0) => {}
                    Ok(purged) => tracing::debug!(purged, "Purged expired key-value entries"),
                    Err(e) => {
                        tracing::error!(error = %e, "Key-value sweep failed, stopping sweeper");
                        break;
                    }
                }
            }
        })
    }
}

impl KeyValueStore for MemoryKeyValueStore {
    async fn set_with_ttl(&self, key: &str, value: &str, ttl: Duration) -> KvResult<()> {
        let entry = Entry {
            value: value.to_string(),
            expires_at: Instant::now() + ttl,
        };
        self.lock()?.insert(key.to_string(), entry);
        Ok(())
    }

    async fn get(&self, key: &str) -> KvResult<Option<String>> {
        let mut entries = self.lock()?;
        Ok(Self::live_value(&mut entries, key, Instant::now()).map(str::to_string))
    }

    async fn delete(&self, key: &str) -> KvResult<()> {
        self.lock()?.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> KvResult<bool> {
        let mut entries = self.lock()?;
        Ok(Self::live_value(&mut entries, key, Instant::now()).is_some())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        ttl: Duration,
    ) -> KvResult<bool> {
        let now = Instant::now();
        let mut entries = self.lock()?;

        if Self::live_value(&mut entries, key, now) != Some(expected) {
            return Ok(false);
        }

        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_string(),
                expires_at: now + ttl,
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{Duration, KeyValueStore, MemoryKeyValueStore};

    const HOUR: Duration = Duration::from_secs(3600);

    #[tokio::test]
    async fn test_set_get_overwrite() {
        let store = MemoryKeyValueStore::new();
        store.set_with_ttl("k", "v1", HOUR).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v1"));

        store.set_with_ttl("k", "v2", HOUR).await.unwrap();
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v2"));
        assert_eq!(store.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_missing_key() {
        let store = MemoryKeyValueStore::new();
        assert_eq!(store.get("missing").await.unwrap(), None);
        assert!(!store.exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = MemoryKeyValueStore::new();
        store.set_with_ttl("k", "v", HOUR).await.unwrap();
        store.delete("k").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(!store.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = MemoryKeyValueStore::new();
        store
            .set_with_ttl("short", "v", Duration::from_millis(20))
            .await
            .unwrap();
        store.set_with_ttl("long", "v", HOUR).await.unwrap();
        assert!(store.exists("short").await.unwrap());

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("short").await.unwrap(), None);
        assert!(!store.exists("short").await.unwrap());
        assert!(store.exists("long").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_never_visible() {
        let store = MemoryKeyValueStore::new();
        store.set_with_ttl("k", "v", Duration::ZERO).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let store = MemoryKeyValueStore::new();
        store.set_with_ttl("a", "v", Duration::ZERO).await.unwrap();
        store.set_with_ttl("b", "v", Duration::ZERO).await.unwrap();
        store.set_with_ttl("c", "v", HOUR).await.unwrap();

        assert_eq!(store.purge_expired().unwrap(), 2);
        assert_eq!(store.len().unwrap(), 1);
        assert!(!store.is_empty().unwrap());
    }

    #[tokio::test]
    async fn test_compare_and_set() {
        let store = MemoryKeyValueStore::new();
        store.set_with_ttl("k", "old", HOUR).await.unwrap();

        assert!(!store.compare_and_set("k", "other", "new", HOUR).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("old"));

        assert!(store.compare_and_set("k", "old", "new", HOUR).await.unwrap());
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));

        // The old value no longer matches
        assert!(!store.compare_and_set("k", "old", "newer", HOUR).await.unwrap());
    }

    #[tokio::test]
    async fn test_compare_and_set_on_missing_or_expired() {
        let store = MemoryKeyValueStore::new();
        assert!(!store.compare_and_set("k", "v", "new", HOUR).await.unwrap());

        store.set_with_ttl("k", "v", Duration::ZERO).await.unwrap();
        assert!(!store.compare_and_set("k", "v", "new", HOUR).await.unwrap());
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = MemoryKeyValueStore::new();
        let clone = store.clone();
        store.set_with_ttl("k", "v", HOUR).await.unwrap();
        assert!(clone.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn test_sweeper_purges_in_background() {
        let store = MemoryKeyValueStore::new();
        store.set_with_ttl("k", "v", Duration::ZERO).await.unwrap();

        let handle = store.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert_eq!(store.purge_expired().unwrap(), 0);
    }
}
