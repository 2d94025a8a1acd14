//! Bundled datasets used when live sources are unavailable.

mod bands;
mod eips;
mod projects;

pub use bands::{band_for, ExtraSpec, MetricBand};
pub use eips::fallback_eips;
pub use projects::fallback_projects;
