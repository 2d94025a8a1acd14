//! Upstream data sources and the bundled fallback collaborator.
//!
//! A [`DataSource`] may fail for any reason (network, auth, bad payload); the
//! dataset services treat every failure the same way and switch to the
//! [`StaticDataset`] fallback.

mod dune;
mod http;
mod fallback;

pub use dune::{AnalyticsQuery, AnalyticsSource, DuneClient};
pub use fallback::StaticDataset;
pub use http::{build_http_client, HttpJsonSource};

use std::marker::PhantomData;

use async_trait::async_trait;

use crate::models::{duplicate_key, Keyed};

/// Why an upstream source could not deliver.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("source not configured")]
    NotConfigured,
    #[error("http error: {0}")]
    Http(String),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unauthorized")]
    Unauthorized,
    #[error("rate limited")]
    RateLimited,
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("failed to read {path}: {message}")]
    File { path: String, message: String },
}

impl SourceError {
    /// Whether the failure means "nothing to call" rather than "call failed".
    pub fn is_not_configured(&self) -> bool {
        matches!(self, SourceError::NotConfigured)
    }
}

/// Reject a catalog in which two records share a key.
pub fn check_unique_keys<T: Keyed>(records: Vec<T>) -> Result<Vec<T>, SourceError> {
    match duplicate_key(&records).map(|key| key.to_string()) {
        Some(key) => Err(SourceError::InvalidResponse(format!(
            "duplicate record key {key}"
        ))),
        None => Ok(records),
    }
}

/// A primary provider of catalog records.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<T>, SourceError>;
}

/// Placeholder primary source used when no upstream is configured.
pub struct UnconfiguredSource<T> {
    name: &'static str,
    _records: PhantomData<fn() -> T>,
}

impl<T> UnconfiguredSource<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            _records: PhantomData,
        }
    }
}

#[async_trait]
impl<T: Send + 'static> DataSource<T> for UnconfiguredSource<T> {
    fn name(&self) -> &str {
        self.name
    }

    async fn load(&self) -> Result<Vec<T>, SourceError> {
        Err(SourceError::NotConfigured)
    }
}
