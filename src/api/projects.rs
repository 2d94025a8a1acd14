//! Project API endpoints.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{parse_label, success, ApiResult};
use crate::errors::AppError;
use crate::models::{Project, ProjectStatus};
use crate::stats::ProjectStats;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListProjectsParams {
    pub q: Option<String>,
    pub status: Option<String>,
}

/// GET /api/projects - List projects, optionally searched and narrowed by status.
pub async fn list_projects(
    State(state): State<AppState>,
    Query(params): Query<ListProjectsParams>,
) -> ApiResult<Vec<Project>> {
    let status = parse_label("status", params.status.as_deref(), ProjectStatus::from_label)?;
    success(state.projects.list(params.q.as_deref(), status).await)
}

/// GET /api/projects/{id} - Get a single project.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Project> {
    match state.projects.get_project(&id).await {
        Some(project) => success(project),
        None => Err(AppError::NotFound(format!("Project {} not found", id))),
    }
}

/// GET /api/projects/stats - Project counts by status and proposal.
pub async fn project_stats(State(state): State<AppState>) -> ApiResult<ProjectStats> {
    success(state.projects.stats().await)
}
