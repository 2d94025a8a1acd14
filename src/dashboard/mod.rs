//! Dashboard view model.
//!
//! Owns the hooks the dashboard screen binds to: a catalog overview fetched on
//! mount and a live metrics feed polled on an interval.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::Clock;
use crate::errors::AppError;
use crate::hooks::{fetcher, QueryHook, QueryState};
use crate::models::{Eip, MetricsSnapshot};
use crate::services::{EipService, MetricsService, ProjectService};
use crate::stats::{AggregatedStats, ProjectStats};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogOverview {
    pub eips: Vec<Eip>,
    pub stats: AggregatedStats,
    pub project_stats: ProjectStats,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    pub overview: QueryState<CatalogOverview>,
    pub live_metrics: QueryState<Vec<MetricsSnapshot>>,
    /// Whether either hook has a fetch in flight.
    pub loading: bool,
    pub polling: bool,
    pub poll_interval_secs: u64,
}

pub struct Dashboard {
    overview: QueryHook<CatalogOverview>,
    live_metrics: QueryHook<Vec<MetricsSnapshot>>,
    poll_interval: Duration,
}

impl Dashboard {
    pub fn new(
        eips: Arc<EipService>,
        projects: Arc<ProjectService>,
        metrics: Arc<MetricsService>,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Self {
        let overview = {
            let eips = eips.clone();
            QueryHook::new(
                "catalog-overview",
                fetcher(move || {
                    let eips = eips.clone();
                    let projects = projects.clone();
                    async move {
                        let all = eips.get_all().await;
                        let stats = eips.compute_stats(&all);
                        let project_stats = projects.stats().await;
                        Ok::<_, AppError>(CatalogOverview {
                            eips: all.to_vec(),
                            stats,
                            project_stats,
                        })
                    }
                }),
                clock.clone(),
            )
        };

        let live_metrics = QueryHook::new(
            "live-metrics",
            fetcher(move || {
                let eips = eips.clone();
                let metrics = metrics.clone();
                async move {
                    let numbers: Vec<u32> = eips.get_all().await.iter().map(|e| e.number).collect();
                    Ok::<_, AppError>(metrics.get_many(&numbers).await)
                }
            }),
            clock,
        );

        Self {
            overview,
            live_metrics,
            poll_interval,
        }
    }

    /// Mount both hooks and start polling live metrics.
    pub async fn mount(&self) {
        tokio::join!(self.overview.mount(), self.live_metrics.mount());
        self.live_metrics.poll_every(self.poll_interval);
        tracing::info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "dashboard mounted"
        );
    }

    /// Manually refetch both hooks.
    pub async fn refresh(&self) -> DashboardSnapshot {
        tokio::join!(self.overview.refetch(), self.live_metrics.refetch());
        self.snapshot()
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        let overview = self.overview.snapshot();
        let live_metrics = self.live_metrics.snapshot();
        DashboardSnapshot {
            loading: overview.is_loading() || live_metrics.is_loading(),
            overview,
            live_metrics,
            polling: self.live_metrics.is_polling(),
            poll_interval_secs: self.poll_interval.as_secs(),
        }
    }

    pub fn unmount(&self) {
        self.overview.unmount();
        self.live_metrics.unmount();
        tracing::info!("dashboard unmounted");
    }
}
