//! Cache inspection endpoints.

use axum::extract::State;
use serde::Serialize;

use super::{success, ApiResult};
use crate::services::CacheStatus;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CacheOverview {
    pub caches: Vec<CacheStatus>,
}

async fn overview(state: &AppState) -> CacheOverview {
    let (eips, projects, metrics) = tokio::join!(
        state.eips.cache_status(),
        state.projects.cache_status(),
        state.metrics.cache_status()
    );
    CacheOverview {
        caches: vec![eips, projects, metrics],
    }
}

/// GET /api/cache - Entry counts, TTLs and in-flight loads per cache.
pub async fn cache_status(State(state): State<AppState>) -> ApiResult<CacheOverview> {
    success(overview(&state).await)
}

/// POST /api/cache/clear - Drop every cached entry so the next read reloads.
pub async fn clear_caches(State(state): State<AppState>) -> ApiResult<CacheOverview> {
    tokio::join!(
        state.eips.invalidate(),
        state.projects.invalidate(),
        state.metrics.invalidate_all()
    );
    tracing::info!("all caches cleared");
    success(overview(&state).await)
}
