//! Read-through data services.
//!
//! Each service owns its cache and sources; the composition root in `main`
//! builds one instance of each and shares it through the application state.

mod dataset;
mod eips;
mod metrics;
mod projects;

pub use dataset::{CacheStatus, DatasetService};
pub use eips::{EipQuery, EipService};
pub use metrics::{Analytics, MetricsService};
pub use projects::ProjectService;
