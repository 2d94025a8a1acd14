//! Live adoption metrics.
//!
//! Snapshots come from the analytics source when one is configured and has a
//! row for the proposal; otherwise they are synthesized from the band table.
//! The analytics query returns rows for every proposal at once, so its result
//! is cached under one key and shared by all per-proposal loads.
//! Synthetic values jitter between loads, but the shape never changes and
//! every value stays inside its band.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde_json::{Map, Value};

use crate::cache::{Clock, SingleFlight, TimedCache};
use crate::data::{band_for, ExtraSpec};
use crate::models::{
    clamp_adoption, format_daily_volume, format_gas_usage, MetricValue, MetricsOrigin,
    MetricsSnapshot,
};
use crate::sources::{AnalyticsQuery, AnalyticsSource, SourceError};

use super::dataset::CacheStatus;

const NUMBER_FIELD: &str = "eip_number";
const ADOPTION_FIELD: &str = "adoption_rate";
const VOLUME_FIELD: &str = "daily_transactions";
const GAS_FIELD: &str = "gas_per_day";
const PROJECTS_FIELD: &str = "active_projects";

const ROWS_KEY: &str = "rows";

/// An analytics source bound to the saved query that produces metric rows.
#[derive(Clone)]
pub struct Analytics {
    pub source: Arc<dyn AnalyticsSource>,
    pub query: AnalyticsQuery,
}

/// The analytics query result, fetched at most once per TTL.
struct AnalyticsRows {
    analytics: Analytics,
    cache: TimedCache<Arc<Vec<Value>>>,
    flights: SingleFlight<Option<Arc<Vec<Value>>>>,
    generation: Arc<AtomicU64>,
}

impl AnalyticsRows {
    /// All rows, or `None` when the query failed.
    async fn get(&self) -> Option<Arc<Vec<Value>>> {
        if let Some(rows) = self.cache.get(ROWS_KEY).await {
            return Some(rows);
        }

        let analytics = self.analytics.clone();
        let cache = self.cache.clone();
        let generation = self.generation.clone();
        let started = generation.load(Ordering::SeqCst);

        self.flights
            .run(ROWS_KEY, move || async move {
                match analytics.source.fetch(&analytics.query).await {
                    Ok(rows) => {
                        tracing::debug!(count = rows.len(), "fetched analytics rows");
                        let rows = Arc::new(rows);
                        if generation.load(Ordering::SeqCst) == started {
                            cache.set(ROWS_KEY, rows.clone()).await;
                        }
                        Some(rows)
                    }
                    Err(e) => {
                        tracing::warn!(
                            dataset = "metrics",
                            source = "analytics",
                            error = %e,
                            "source unavailable, serving fallback dataset"
                        );
                        None
                    }
                }
            })
            .await
    }

    async fn invalidate(&self) {
        self.flights.forget(ROWS_KEY);
        self.cache.invalidate(ROWS_KEY).await;
    }
}

pub struct MetricsService {
    cache: TimedCache<MetricsSnapshot>,
    flights: SingleFlight<MetricsSnapshot>,
    rows: Option<Arc<AnalyticsRows>>,
    clock: Arc<dyn Clock>,
    degraded: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

fn cache_key(number: u32) -> String {
    format!("eip:{number}")
}

impl MetricsService {
    pub fn new(
        cache: TimedCache<MetricsSnapshot>,
        analytics: Option<Analytics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let generation = Arc::new(AtomicU64::new(0));
        let rows = analytics.map(|analytics| {
            Arc::new(AnalyticsRows {
                analytics,
                cache: TimedCache::new(cache.ttl(), clock.clone()),
                flights: SingleFlight::new(),
                generation: generation.clone(),
            })
        });
        Self {
            cache,
            flights: SingleFlight::new(),
            rows,
            clock,
            degraded: Arc::new(AtomicBool::new(false)),
            generation,
        }
    }

    /// Current metrics for proposal `number`. Never fails.
    pub async fn get_metrics(&self, number: u32) -> MetricsSnapshot {
        let key = cache_key(number);
        if let Some(snapshot) = self.cache.get(&key).await {
            tracing::trace!(eip = number, "metrics cache hit");
            return snapshot;
        }

        let rows = self.rows.clone();
        let clock = self.clock.clone();
        let cache = self.cache.clone();
        let degraded = self.degraded.clone();
        let generation = self.generation.clone();
        let started = generation.load(Ordering::SeqCst);
        let flight_key = key.clone();

        self.flights
            .run(&key, move || async move {
                let snapshot = load_snapshot(number, rows, clock, &degraded).await;
                if generation.load(Ordering::SeqCst) == started {
                    cache.set(&flight_key, snapshot.clone()).await;
                }
                snapshot
            })
            .await
    }

    /// Metrics for several proposals, in the order given.
    pub async fn get_many(&self, numbers: &[u32]) -> Vec<MetricsSnapshot> {
        futures::future::join_all(numbers.iter().map(|n| self.get_metrics(*n))).await
    }

    /// Drop the cached snapshot for `number` along with the analytics rows,
    /// so the next read goes back to the source.
    pub async fn invalidate(&self, number: u32) -> bool {
        let key = cache_key(number);
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.flights.forget(&key);
        if let Some(rows) = &self.rows {
            rows.invalidate().await;
        }
        self.cache.invalidate(&key).await
    }

    /// Drop every cached snapshot and the analytics rows.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(rows) = &self.rows {
            rows.invalidate().await;
        }
        self.cache.clear().await;
    }

    pub async fn cache_status(&self) -> CacheStatus {
        CacheStatus {
            dataset: "metrics",
            ttl_secs: self.cache.ttl().as_secs(),
            entries: self.cache.len().await,
            in_flight: self.flights.in_flight(),
            degraded: self.degraded.load(Ordering::Relaxed),
        }
    }
}

/// `degraded` tracks the last analytics outcome: set when the query fails or
/// a proposal's row is invalid, cleared when a row is used. A proposal
/// without a row leaves it alone.
async fn load_snapshot(
    number: u32,
    rows: Option<Arc<AnalyticsRows>>,
    clock: Arc<dyn Clock>,
    degraded: &AtomicBool,
) -> MetricsSnapshot {
    let Some(rows) = rows else {
        return synthesize(number, clock.now());
    };

    let fetched = rows.get().await;
    let now = clock.now();
    let Some(fetched) = fetched else {
        degraded.store(true, Ordering::Relaxed);
        return synthesize(number, now);
    };

    let row = fetched
        .iter()
        .filter_map(Value::as_object)
        .find(|row| row_number(row) == Some(number));
    match row.map(|row| snapshot_from_row(number, row, now)) {
        Some(Ok(snapshot)) => {
            degraded.store(false, Ordering::Relaxed);
            snapshot
        }
        Some(Err(e)) => {
            degraded.store(true, Ordering::Relaxed);
            tracing::warn!(
                dataset = "metrics",
                source = "analytics",
                eip = number,
                error = %e,
                "invalid analytics row, synthesizing metrics"
            );
            synthesize(number, now)
        }
        None => {
            tracing::debug!(eip = number, "no analytics row, synthesizing metrics");
            synthesize(number, now)
        }
    }
}

fn row_number(row: &Map<String, Value>) -> Option<u32> {
    row.get(NUMBER_FIELD)
        .and_then(parse_magnitude)
        .filter(|n| n.fract() == 0.0 && *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
}

/// Read a magnitude from a JSON number or a display string such as
/// `"1,200,000"`, `"1.2M"` or `"3.4B gas/day"`.
fn parse_magnitude(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let token = s.split_whitespace().next()?;
            let token = token.split('/').next()?.replace(',', "");
            let (digits, scale) = match token.chars().last()?.to_ascii_uppercase() {
                'K' => (&token[..token.len() - 1], 1e3),
                'M' => (&token[..token.len() - 1], 1e6),
                'B' => (&token[..token.len() - 1], 1e9),
                _ => (token.as_str(), 1.0),
            };
            digits.parse::<f64>().ok().map(|v| v * scale)
        }
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

fn required(row: &Map<String, Value>, field: &str) -> Result<f64, SourceError> {
    row.get(field)
        .and_then(parse_magnitude)
        .ok_or_else(|| SourceError::InvalidResponse(format!("row field {field} missing or invalid")))
}

fn snapshot_from_row(
    number: u32,
    row: &Map<String, Value>,
    now: DateTime<Utc>,
) -> Result<MetricsSnapshot, SourceError> {
    let adoption = clamp_adoption(required(row, ADOPTION_FIELD)?);
    let volume = required(row, VOLUME_FIELD)?;
    let gas = required(row, GAS_FIELD)?;
    let projects = row
        .get(PROJECTS_FIELD)
        .and_then(parse_magnitude)
        .map(|n| n.clamp(0.0, f64::from(u32::MAX)).round() as u32)
        .unwrap_or(0);

    let mut additional_metrics = BTreeMap::new();
    for (name, value) in row {
        if [NUMBER_FIELD, ADOPTION_FIELD, VOLUME_FIELD, GAS_FIELD, PROJECTS_FIELD]
            .contains(&name.as_str())
        {
            continue;
        }
        let metric = match value {
            Value::Number(n) => n.as_f64().filter(|v| v.is_finite()).map(MetricValue::Number),
            Value::String(s) => Some(MetricValue::Text(s.clone())),
            _ => None,
        };
        if let Some(metric) = metric {
            additional_metrics.insert(name.clone(), metric);
        }
    }

    Ok(MetricsSnapshot {
        eip_number: number,
        adoption_rate: adoption,
        transaction_volume: format_daily_volume(volume),
        gas_usage: format_gas_usage(gas),
        active_projects: projects,
        last_updated: now,
        additional_metrics,
        origin: MetricsOrigin::Analytics,
    })
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Draw a snapshot from the band for `number`.
pub fn synthesize(number: u32, now: DateTime<Utc>) -> MetricsSnapshot {
    let band = band_for(number);
    let mut rng = rand::thread_rng();

    let adoption = round1(rng.gen_range(band.adoption.0..=band.adoption.1));
    let volume = rng.gen_range(band.daily_transactions.0..=band.daily_transactions.1);
    let gas = rng.gen_range(band.gas_per_day.0..=band.gas_per_day.1);
    let projects = rng.gen_range(band.active_projects.0..=band.active_projects.1);

    let additional_metrics = band
        .extras
        .iter()
        .map(|extra| match *extra {
            ExtraSpec::Number(name, lo, hi) => {
                (name.to_string(), MetricValue::Number(rng.gen_range(lo..=hi).round()))
            }
            ExtraSpec::Percentage(name, lo, hi) => {
                (name.to_string(), MetricValue::Percentage(round1(rng.gen_range(lo..=hi))))
            }
            ExtraSpec::Text(name, value) => (name.to_string(), MetricValue::Text(value.to_string())),
        })
        .collect();

    MetricsSnapshot {
        eip_number: number,
        adoption_rate: clamp_adoption(adoption),
        transaction_volume: format_daily_volume(volume),
        gas_usage: format_gas_usage(gas),
        active_projects: projects,
        last_updated: now,
        additional_metrics,
        origin: MetricsOrigin::Synthetic,
    }
}
