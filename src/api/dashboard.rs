//! Dashboard API endpoints.

use axum::extract::State;

use super::{success, ApiResult};
use crate::dashboard::DashboardSnapshot;
use crate::AppState;

/// GET /api/dashboard - Current hook snapshots.
pub async fn get_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSnapshot> {
    success(state.dashboard.snapshot())
}

/// POST /api/dashboard/refresh - Refetch both hooks and return the settled snapshots.
pub async fn refresh_dashboard(State(state): State<AppState>) -> ApiResult<DashboardSnapshot> {
    success(state.dashboard.refresh().await)
}
