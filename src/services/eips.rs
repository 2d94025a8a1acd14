use std::sync::Arc;

use crate::cache::Clock;
use crate::catalog::{filter_eips, sort_eips, EipFilter, SortField, SortOrder};
use crate::models::Eip;
use crate::stats::{compute_stats, AggregatedStats};

use super::dataset::{CacheStatus, DatasetService};

/// Listing parameters for the proposal catalog.
#[derive(Debug, Clone, Default)]
pub struct EipQuery {
    pub text: Option<String>,
    pub filter: EipFilter,
    pub sort: SortField,
    pub order: SortOrder,
}

/// The proposal catalog.
pub struct EipService {
    dataset: DatasetService<Eip>,
    clock: Arc<dyn Clock>,
}

impl EipService {
    pub fn new(dataset: DatasetService<Eip>, clock: Arc<dyn Clock>) -> Self {
        Self { dataset, clock }
    }

    pub async fn get_all(&self) -> Arc<Vec<Eip>> {
        self.dataset.get_all().await
    }

    pub async fn get_eip(&self, number: u32) -> Option<Eip> {
        self.dataset.get_by_key(&number).await
    }

    pub async fn search(&self, query: &str, haystack: Option<&[Eip]>) -> Vec<Eip> {
        self.dataset.search(query, haystack).await
    }

    /// Search, then filter, then sort.
    pub async fn list(&self, query: &EipQuery) -> Vec<Eip> {
        let text = query.text.as_deref().unwrap_or_default();
        let found = self.search(text, None).await;
        let mut eips = filter_eips(&found, &query.filter);
        sort_eips(&mut eips, query.sort, query.order);
        eips
    }

    /// Stats over the whole catalog as of now.
    pub async fn stats(&self) -> AggregatedStats {
        let eips = self.dataset.get_all().await;
        compute_stats(&eips, self.clock.now())
    }

    /// Stats over an arbitrary collection as of now.
    pub fn compute_stats(&self, eips: &[Eip]) -> AggregatedStats {
        compute_stats(eips, self.clock.now())
    }

    /// Proposals referenced by `number` through `requires`, `replaces` or
    /// `supersededBy`. Dangling references are skipped. `None` when `number`
    /// itself is not in the catalog.
    pub async fn related(&self, number: u32) -> Option<Vec<Eip>> {
        let eips = self.dataset.get_all().await;
        let eip = eips.iter().find(|e| e.number == number)?;
        Some(
            eip.referenced_numbers()
                .into_iter()
                .filter_map(|n| eips.iter().find(|e| e.number == n).cloned())
                .collect(),
        )
    }

    pub async fn invalidate(&self) {
        self.dataset.invalidate().await;
    }

    pub async fn cache_status(&self) -> CacheStatus {
        self.dataset.cache_status().await
    }
}
