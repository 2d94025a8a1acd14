//! Proposal API endpoints.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use super::{parse_label, parse_number, success, ApiResult};
use crate::catalog::{EipFilter, SortField, SortOrder};
use crate::errors::AppError;
use crate::models::{Eip, EipCategory, EipStatus, EipType, MetricsSnapshot, Project};
use crate::services::EipQuery;
use crate::stats::AggregatedStats;
use crate::AppState;

/// Listing query parameters. Every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct ListEipsParams {
    pub q: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub eip_type: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

impl ListEipsParams {
    fn into_query(self) -> Result<EipQuery, AppError> {
        Ok(EipQuery {
            filter: EipFilter {
                status: parse_label("status", self.status.as_deref(), EipStatus::from_label)?,
                eip_type: parse_label("type", self.eip_type.as_deref(), EipType::from_label)?,
                category: parse_label(
                    "category",
                    self.category.as_deref(),
                    EipCategory::from_label,
                )?,
                author: self.author,
            },
            sort: parse_label("sort", self.sort.as_deref(), SortField::from_label)?
                .unwrap_or_default(),
            order: parse_label("order", self.order.as_deref(), SortOrder::from_label)?
                .unwrap_or_default(),
            text: self.q,
        })
    }
}

/// GET /api/eips - Search, filter and sort the catalog.
pub async fn list_eips(
    State(state): State<AppState>,
    Query(params): Query<ListEipsParams>,
) -> ApiResult<Vec<Eip>> {
    let query = params.into_query()?;
    success(state.eips.list(&query).await)
}

async fn require_eip(state: &AppState, raw: &str) -> Result<Eip, AppError> {
    let number = parse_number(raw)?;
    state
        .eips
        .get_eip(number)
        .await
        .ok_or_else(|| AppError::NotFound(format!("EIP {} not found", number)))
}

/// GET /api/eips/{number} - Get a single proposal.
pub async fn get_eip(State(state): State<AppState>, Path(number): Path<String>) -> ApiResult<Eip> {
    success(require_eip(&state, &number).await?)
}

/// GET /api/eips/{number}/related - Proposals this one requires, replaces or is superseded by.
pub async fn related_eips(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Vec<Eip>> {
    let number = parse_number(&number)?;
    match state.eips.related(number).await {
        Some(related) => success(related),
        None => Err(AppError::NotFound(format!("EIP {} not found", number))),
    }
}

/// GET /api/eips/{number}/projects - Projects implementing a proposal.
pub async fn eip_projects(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<Vec<Project>> {
    let eip = require_eip(&state, &number).await?;
    success(state.projects.for_eip(eip.number).await)
}

/// GET /api/eips/{number}/metrics - Live metrics for a proposal.
pub async fn eip_metrics(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<MetricsSnapshot> {
    let eip = require_eip(&state, &number).await?;
    success(state.metrics.get_metrics(eip.number).await)
}

/// POST /api/eips/{number}/metrics/refresh - Drop the cached snapshot and load a fresh one.
pub async fn refresh_eip_metrics(
    State(state): State<AppState>,
    Path(number): Path<String>,
) -> ApiResult<MetricsSnapshot> {
    let eip = require_eip(&state, &number).await?;
    state.metrics.invalidate(eip.number).await;
    success(state.metrics.get_metrics(eip.number).await)
}

/// GET /api/stats - Aggregated catalog stats.
pub async fn get_stats(State(state): State<AppState>) -> ApiResult<AggregatedStats> {
    success(state.eips.stats().await)
}
