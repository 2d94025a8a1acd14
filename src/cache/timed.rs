//! Key/value store with a fixed per-entry time-to-live.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::RwLock;

use super::Clock;

struct CacheEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// Read-through cache shared by the dataset services.
///
/// Expired entries are never swept; they are ignored by `get` and replaced by
/// the next `set` for the same key. Key spaces here are bounded by catalog
/// size.
pub struct TimedCache<V> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<V>>>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<V> Clone for TimedCache<V> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
            clock: self.clock.clone(),
        }
    }
}

impl<V: Clone> TimedCache<V> {
    /// Create a cache whose entries live for `ttl`.
    ///
    /// # Panics
    ///
    /// Panics if `ttl` is zero or too large to add to a timestamp.
    pub fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        assert!(!ttl.is_zero(), "cache TTL must be greater than zero");
        let ttl = TimeDelta::from_std(ttl).expect("cache TTL out of range");
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl.to_std().unwrap_or_default()
    }

    /// Fresh value for `key`, or `None` if it was never set or has expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if self.clock.now() >= entry.expires_at {
            tracing::trace!(key, "cache entry expired");
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store `value` under `key`, resetting its expiry.
    pub async fn set(&self, key: &str, value: V) {
        assert!(!key.is_empty(), "cache key must not be empty");
        let expires_at = self.clock.now() + self.ttl;
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), CacheEntry { value, expires_at });
    }

    pub async fn invalidate(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// Number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}
