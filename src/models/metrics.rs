//! Live adoption metrics for a single proposal.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scalar in the open `additionalMetrics` bag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum MetricValue {
    Number(f64),
    Percentage(f64),
    Text(String),
}

/// Where a snapshot's numbers came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MetricsOrigin {
    Analytics,
    Synthetic,
}

/// Adoption metrics captured for one proposal at one point in time.
///
/// `transaction_volume` and `gas_usage` are presentation strings formatted from
/// validated magnitudes; they are not meant to be parsed back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub eip_number: u32,
    pub adoption_rate: f64,
    pub transaction_volume: String,
    pub gas_usage: String,
    pub active_projects: u32,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub additional_metrics: BTreeMap<String, MetricValue>,
    pub origin: MetricsOrigin,
}

/// Clamp an adoption rate into `[0, 100]`; non-finite input becomes 0.
pub fn clamp_adoption(rate: f64) -> f64 {
    if rate.is_finite() {
        rate.clamp(0.0, 100.0)
    } else {
        0.0
    }
}

/// Format a magnitude with a K/M/B suffix and one decimal.
pub fn format_magnitude(value: f64) -> String {
    let value = if value.is_finite() { value.max(0.0) } else { 0.0 };
    if value >= 1e9 {
        format!("{:.1}B", value / 1e9)
    } else if value >= 1e6 {
        format!("{:.1}M", value / 1e6)
    } else if value >= 1e3 {
        format!("{:.1}K", value / 1e3)
    } else {
        format!("{:.0}", value)
    }
}

pub fn format_daily_volume(transactions_per_day: f64) -> String {
    format!("{}/day", format_magnitude(transactions_per_day))
}

pub fn format_gas_usage(gas_per_day: f64) -> String {
    format!("{} gas/day", format_magnitude(gas_per_day))
}
