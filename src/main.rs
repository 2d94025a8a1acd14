//! EIP Dashboard Backend
//!
//! Read-through cached proposal, project and live metrics data behind a JSON API,
//! with bundled fallback datasets whenever an upstream source is unavailable.

mod api;
mod assistant;
mod cache;
mod catalog;
mod config;
mod dashboard;
mod data;
mod errors;
mod hooks;
mod models;
mod search;
mod services;
mod sources;
mod stats;

use std::path::Path;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use serde::de::DeserializeOwned;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use assistant::{AssistantService, OpenRouterProvider, ProviderConfig};
use cache::{Clock, SystemClock, TimedCache};
use config::Config;
use dashboard::Dashboard;
use models::{Eip, Keyed, Project};
use services::{Analytics, DatasetService, EipService, MetricsService, ProjectService};
use sources::{
    build_http_client, AnalyticsQuery, DataSource, DuneClient, HttpJsonSource, SourceError,
    StaticDataset, UnconfiguredSource,
};

/// Rows requested from the analytics query per fetch.
const ANALYTICS_ROW_LIMIT: usize = 1000;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub eips: Arc<EipService>,
    pub projects: Arc<ProjectService>,
    pub metrics: Arc<MetricsService>,
    pub assistant: Arc<AssistantService>,
    pub dashboard: Arc<Dashboard>,
}

/// Bundled records, or `<data_dir>/<file>` when that override exists.
fn fallback_dataset<T: DeserializeOwned + Keyed>(
    data_dir: Option<&Path>,
    file: &str,
    bundled: fn() -> Vec<T>,
) -> Result<StaticDataset<T>, SourceError> {
    match data_dir.map(|dir| dir.join(file)).filter(|path| path.exists()) {
        Some(path) => {
            let dataset = StaticDataset::from_json_file(&path)?;
            tracing::info!("Fallback override {:?} with {} records", path, dataset.len());
            Ok(dataset)
        }
        None => Ok(StaticDataset::new(bundled())),
    }
}

fn primary_source<T>(
    name: &'static str,
    url: Option<&str>,
    client: &reqwest::Client,
) -> Arc<dyn DataSource<T>>
where
    T: DeserializeOwned + Send + 'static,
{
    match url {
        Some(url) => {
            tracing::info!("Primary {} source: {}", name, url);
            Arc::new(HttpJsonSource::new(name, client.clone(), url))
        }
        None => Arc::new(UnconfiguredSource::new(name)),
    }
}

impl AppState {
    /// Composition root: build every service from configuration.
    pub fn build(config: &Config, clock: Arc<dyn Clock>) -> Result<Self, SourceError> {
        let http = build_http_client(config.source_timeout)?;
        let data_dir = config.data_dir.as_deref();

        let eips = Arc::new(EipService::new(
            DatasetService::new(
                "eips",
                TimedCache::new(config.catalog_ttl, clock.clone()),
                primary_source::<Eip>("eips", config.eips_url.as_deref(), &http),
                fallback_dataset(data_dir, "eips.json", data::fallback_eips)?,
            ),
            clock.clone(),
        ));

        let projects = Arc::new(ProjectService::new(DatasetService::new(
            "projects",
            TimedCache::new(config.catalog_ttl, clock.clone()),
            primary_source::<Project>("projects", config.projects_url.as_deref(), &http),
            fallback_dataset(data_dir, "projects.json", data::fallback_projects)?,
        )));

        let analytics = config.dune.as_ref().map(|dune| {
            tracing::info!("Metrics analytics query: {}", dune.query_id);
            Analytics {
                source: Arc::new(DuneClient::new(
                    http.clone(),
                    dune.api_key.clone(),
                    dune.base_url.clone(),
                )),
                query: AnalyticsQuery {
                    query_id: dune.query_id,
                    limit: ANALYTICS_ROW_LIMIT,
                },
            }
        });
        let metrics = Arc::new(MetricsService::new(
            TimedCache::new(config.metrics_ttl, clock.clone()),
            analytics,
            clock.clone(),
        ));

        let provider = config.openrouter.as_ref().map(|openrouter| ProviderConfig {
            provider: Arc::new(OpenRouterProvider::new(
                http.clone(),
                openrouter.api_key.clone(),
                openrouter.base_url.clone(),
            )),
            model: openrouter.model.clone(),
        });
        let assistant = Arc::new(AssistantService::new(provider, eips.clone()));
        if !assistant.has_provider() {
            tracing::warn!("No OPENROUTER_API_KEY configured. Assistant will use canned replies.");
        }

        let dashboard = Arc::new(Dashboard::new(
            eips.clone(),
            projects.clone(),
            metrics.clone(),
            clock,
            config.poll_interval,
        ));

        Ok(Self {
            eips,
            projects,
            metrics,
            assistant,
            dashboard,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env();

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting EIP Dashboard Backend");
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        "Cache TTLs: catalog {:?}, metrics {:?}",
        config.catalog_ttl,
        config.metrics_ttl
    );

    let state = AppState::build(&config, Arc::new(SystemClock))?;

    // Mount the dashboard hooks; this warms the caches
    state.dashboard.mount().await;

    let dashboard = state.dashboard.clone();
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    dashboard.unmount();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // API routes
    let api_routes = Router::new()
        // Proposals
        .route("/eips", get(api::list_eips))
        .route("/eips/{number}", get(api::get_eip))
        .route("/eips/{number}/related", get(api::related_eips))
        .route("/eips/{number}/projects", get(api::eip_projects))
        .route("/eips/{number}/metrics", get(api::eip_metrics))
        .route("/eips/{number}/metrics/refresh", post(api::refresh_eip_metrics))
        .route("/stats", get(api::get_stats))
        // Projects
        .route("/projects", get(api::list_projects))
        .route("/projects/stats", get(api::project_stats))
        .route("/projects/{id}", get(api::get_project))
        // Dashboard
        .route("/dashboard", get(api::get_dashboard))
        .route("/dashboard/refresh", post(api::refresh_dashboard))
        // Assistant
        .route("/assistant/chat", post(api::chat))
        // Caches
        .route("/cache", get(api::cache_status))
        .route("/cache/clear", post(api::clear_caches));

    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
