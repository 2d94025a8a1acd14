//! Generic read-through dataset service.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

use crate::cache::{SingleFlight, TimedCache};
use crate::models::{Eip, Keyed, Project};
use crate::search::{self, Searchable};
use crate::sources::{check_unique_keys, DataSource, StaticDataset};

const ALL_KEY: &str = "all";

/// A keyed, searchable catalog record.
pub trait Record: Keyed + Searchable + Clone + Send + Sync + 'static {}

impl Record for Eip {}

impl Record for Project {}

/// Cache status reported for one dataset.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatus {
    pub dataset: &'static str,
    pub ttl_secs: u64,
    pub entries: usize,
    pub in_flight: usize,
    pub degraded: bool,
}

/// Serves a catalog from cache, the primary source, or the bundled fallback.
///
/// `get_all` never fails: any primary source error is logged and replaced by
/// the fallback dataset, which is then cached like a normal result. A load
/// only writes the cache if no invalidation happened while it ran.
pub struct DatasetService<T: Record> {
    name: &'static str,
    cache: TimedCache<Arc<Vec<T>>>,
    flights: SingleFlight<Arc<Vec<T>>>,
    primary: Arc<dyn DataSource<T>>,
    fallback: StaticDataset<T>,
    degraded: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl<T: Record> DatasetService<T> {
    pub fn new(
        name: &'static str,
        cache: TimedCache<Arc<Vec<T>>>,
        primary: Arc<dyn DataSource<T>>,
        fallback: StaticDataset<T>,
    ) -> Self {
        Self {
            name,
            cache,
            flights: SingleFlight::new(),
            primary,
            fallback,
            degraded: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The whole catalog, cached for the configured TTL.
    pub async fn get_all(&self) -> Arc<Vec<T>> {
        if let Some(records) = self.cache.get(ALL_KEY).await {
            tracing::trace!(dataset = self.name, "cache hit");
            return records;
        }
        tracing::debug!(dataset = self.name, "cache miss");

        let name = self.name;
        let primary = self.primary.clone();
        let fallback = self.fallback.clone();
        let cache = self.cache.clone();
        let degraded = self.degraded.clone();
        let generation = self.generation.clone();
        let started = generation.load(Ordering::SeqCst);

        self.flights
            .run(ALL_KEY, move || async move {
                let records = match primary.load().await.and_then(check_unique_keys) {
                    Ok(records) => {
                        tracing::info!(
                            dataset = name,
                            source = primary.name(),
                            count = records.len(),
                            "loaded dataset from primary source"
                        );
                        degraded.store(false, Ordering::Relaxed);
                        Arc::new(records)
                    }
                    Err(e) if e.is_not_configured() => {
                        tracing::debug!(
                            dataset = name,
                            source = primary.name(),
                            "no primary source configured, serving fallback dataset"
                        );
                        degraded.store(false, Ordering::Relaxed);
                        fallback.load()
                    }
                    Err(e) => {
                        tracing::warn!(
                            dataset = name,
                            source = primary.name(),
                            error = %e,
                            "source unavailable, serving fallback dataset"
                        );
                        degraded.store(true, Ordering::Relaxed);
                        fallback.load()
                    }
                };
                if generation.load(Ordering::SeqCst) == started {
                    cache.set(ALL_KEY, records.clone()).await;
                } else {
                    tracing::debug!(dataset = name, "invalidated during load, not cached");
                }
                records
            })
            .await
    }

    /// The record with `key`, or `None` when the catalog has no such record.
    pub async fn get_by_key(&self, key: &T::Key) -> Option<T> {
        self.get_all().await.iter().find(|r| r.key() == key).cloned()
    }

    /// Case-insensitive substring search over `haystack`, or over the whole
    /// catalog when no haystack is given. A blank query returns the haystack.
    pub async fn search(&self, query: &str, haystack: Option<&[T]>) -> Vec<T> {
        match haystack {
            Some(records) => search::search(query, records),
            None => search::search(query, &self.get_all().await),
        }
    }

    /// Drop the cached catalog so the next read reloads it. A load already
    /// running finishes for its callers but does not refill the cache.
    pub async fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.flights.forget(ALL_KEY);
        if self.cache.invalidate(ALL_KEY).await {
            tracing::info!(dataset = self.name, "cache invalidated");
        }
    }

    /// Whether the last load fell back because the primary source failed.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Relaxed)
    }

    pub async fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            dataset: self.name,
            ttl_secs: self.cache.ttl().as_secs(),
            entries: self.cache.len().await,
            in_flight: self.flights.in_flight(),
            degraded: self.is_degraded(),
        }
    }
}
