use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
    last_used: Instant,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// In-process key/value cache with per-entry expiry and a size bound.
///
/// Expired entries are dropped when touched. When a new key would exceed the
/// capacity, expired entries are purged first, then the least recently used
/// entry is evicted. A capacity of zero disables caching.
pub struct CacheManager<K, V> {
    entries: Mutex<HashMap<K, CacheEntry<V>>>,
    capacity: usize,
}

impl<K, V> CacheManager<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    /// Creates an empty cache holding at most `capacity` entries
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Returns the cached value for `key` if present and not expired
    pub async fn get(&self, key: &K) -> Option<V> {
        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        match entries.get_mut(key) {
            Some(entry) if entry.is_expired(now) => {
                entries.remove(key);
                None
            }
            Some(entry) => {
                entry.last_used = now;
                Some(entry.value.clone())
            }
            None => None,
        }
    }

    /// Stores `value` under `key` for `ttl`
    pub async fn insert(&self, key: K, value: V, ttl: Duration) {
        if self.capacity == 0 {
            return;
        }

        let mut entries = self.entries.lock().await;
        let now = Instant::now();

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !entry.is_expired(now));
        }
        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                tracing::debug!(key = ?oldest, "Evicting least recently used cache entry");
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                value,
                expires_at: now + ttl,
                last_used: now,
            },
        );
    }

    /// Returns the cached value, or runs `fetch_fn` on a miss and caches its result.
    ///
    /// The lock is not held while fetching, so concurrent misses on the same
    /// key may each fetch; the last one to finish wins.
    ///
    /// # Errors
    ///
    /// Returns the error of `fetch_fn`; nothing is cached in that case
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        fetch_fn: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(cached) = self.get(&key).await {
            return Ok(cached);
        }

        let fresh = fetch_fn().await?;
        self.insert(key, fresh.clone(), ttl).await;
        Ok(fresh)
    }

    /// Number of stored entries, expired ones included
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}
