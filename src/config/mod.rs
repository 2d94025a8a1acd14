//! Configuration for the dashboard backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Dune Analytics settings; present only when both key and query id are set.
#[derive(Debug, Clone, PartialEq)]
pub struct DuneConfig {
    pub api_key: String,
    pub query_id: u64,
    pub base_url: String,
}

/// Chat provider settings; present only when an API key is set.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// TTL for the proposal and project catalogs
    pub catalog_ttl: Duration,
    /// TTL for metrics snapshots
    pub metrics_ttl: Duration,
    /// Live metrics polling interval
    pub poll_interval: Duration,
    /// HTTP timeout for external sources
    pub source_timeout: Duration,
    /// Primary proposal source (JSON array)
    pub eips_url: Option<String>,
    /// Primary project source (JSON array)
    pub projects_url: Option<String>,
    /// Directory holding `eips.json` / `projects.json` fallback overrides
    pub data_dir: Option<PathBuf>,
    pub dune: Option<DuneConfig>,
    pub openrouter: Option<OpenRouterConfig>,
}

fn non_empty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a positive number of seconds.
///
/// # Panics
///
/// Panics on a malformed or zero value.
fn secs(name: &str, default: u64) -> Duration {
    let secs = match non_empty(name) {
        Some(raw) => raw
            .parse::<u64>()
            .unwrap_or_else(|_| panic!("Invalid {name}: expected a whole number of seconds")),
        None => default,
    };
    assert!(secs > 0, "{name} must be greater than zero");
    Duration::from_secs(secs)
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let bind_addr = env::var("EIPDASH_BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:8080".to_string())
            .parse()
            .expect("Invalid EIPDASH_BIND_ADDR format");

        let log_level = env::var("EIPDASH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let dune = match (non_empty("DUNE_API_KEY"), non_empty("DUNE_QUERY_ID")) {
            (Some(api_key), Some(query_id)) => Some(DuneConfig {
                api_key,
                query_id: query_id.parse().expect("Invalid DUNE_QUERY_ID"),
                base_url: non_empty("DUNE_BASE_URL")
                    .unwrap_or_else(|| "https://api.dune.com/api/v1".to_string()),
            }),
            _ => None,
        };

        let openrouter = non_empty("OPENROUTER_API_KEY").map(|api_key| OpenRouterConfig {
            api_key,
            base_url: non_empty("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| "https://openrouter.ai/api/v1".to_string()),
            model: non_empty("OPENROUTER_MODEL").unwrap_or_else(|| "openai/gpt-4o-mini".to_string()),
        });

        Self {
            bind_addr,
            log_level,
            catalog_ttl: secs("EIPDASH_CATALOG_TTL_SECS", 300),
            metrics_ttl: secs("EIPDASH_METRICS_TTL_SECS", 60),
            poll_interval: secs("EIPDASH_POLL_INTERVAL_SECS", 30),
            source_timeout: secs("EIPDASH_SOURCE_TIMEOUT_SECS", 10),
            eips_url: non_empty("EIPDASH_EIPS_URL"),
            projects_url: non_empty("EIPDASH_PROJECTS_URL"),
            data_dir: non_empty("EIPDASH_DATA_DIR").map(PathBuf::from),
            dune,
            openrouter,
        }
    }
}
