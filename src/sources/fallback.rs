//! The bundled fallback dataset.

use std::path::Path;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use super::{check_unique_keys, SourceError};
use crate::models::Keyed;

/// An immutable in-memory dataset. Loading never fails and always yields the
/// same records.
pub struct StaticDataset<T> {
    records: Arc<Vec<T>>,
}

impl<T> Clone for StaticDataset<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
        }
    }
}

impl<T> StaticDataset<T> {
    pub fn new(records: Vec<T>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn load(&self) -> Arc<Vec<T>> {
        self.records.clone()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

impl<T: DeserializeOwned + Keyed> StaticDataset<T> {
    /// Read a dataset override from a JSON array file.
    ///
    /// Called once at startup; a malformed file or one with duplicate keys
    /// aborts startup.
    pub fn from_json_file(path: &Path) -> Result<Self, SourceError> {
        let file_error = |message: String| SourceError::File {
            path: path.display().to_string(),
            message,
        };
        let raw = std::fs::read_to_string(path).map_err(|e| file_error(e.to_string()))?;
        let records: Vec<T> = serde_json::from_str(&raw).map_err(|e| file_error(e.to_string()))?;
        let records = check_unique_keys(records).map_err(|e| file_error(e.to_string()))?;
        Ok(Self::new(records))
    }
}
