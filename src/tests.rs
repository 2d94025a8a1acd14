//! Integration tests for the dashboard backend.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use crate::cache::SystemClock;
use crate::config::Config;
use crate::dashboard::Dashboard;
use crate::data::fallback_eips;
use crate::{create_router, AppState};

fn test_config() -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        log_level: "warn".to_string(),
        catalog_ttl: Duration::from_secs(300),
        metrics_ttl: Duration::from_secs(60),
        poll_interval: Duration::from_secs(30),
        source_timeout: Duration::from_secs(2),
        eips_url: None,
        projects_url: None,
        data_dir: None,
        dune: None,
        openrouter: None,
    }
}

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    dashboard: Arc<Dashboard>,
}

impl TestFixture {
    async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    async fn with_config(config: Config) -> Self {
        let state =
            AppState::build(&config, Arc::new(SystemClock)).expect("Failed to build state");
        let dashboard = state.dashboard.clone();
        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        TestFixture {
            client: Client::new(),
            base_url,
            dashboard,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> (StatusCode, Value) {
        let resp = self.client.get(self.url(path)).send().await.unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        (status, resp.json().await.unwrap())
    }

    async fn post(&self, path: &str, body: Value) -> (StatusCode, Value) {
        let resp = self
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .unwrap();
        let status = StatusCode::from_u16(resp.status().as_u16()).unwrap();
        (status, resp.json().await.unwrap())
    }
}

fn numbers(body: &Value) -> Vec<u64> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["number"].as_u64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let app = create_router(AppState::build(&test_config(), Arc::new(SystemClock)).unwrap());

    let resp = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_cold_start_serves_fallback_catalog() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/eips").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let listed = numbers(&body);
    assert_eq!(listed.len(), 8);
    assert!(listed.contains(&1559));
    assert!(listed.contains(&721));

    let (_, body) = fixture.get("/api/stats").await;
    assert_eq!(body["data"]["total"], 8);
    assert_eq!(body["data"]["byStatus"]["Final"], 5);
}

#[tokio::test]
async fn test_search_filter_and_sort() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get("/api/eips?q=fee").await;
    assert!(numbers(&body).contains(&1559));

    let (_, body) = fixture.get("/api/eips?status=final&sort=number&order=desc").await;
    assert_eq!(numbers(&body), vec![4844, 2535, 1559, 721, 20]);

    let (_, body) = fixture.get("/api/eips?q=nothing-matches-this").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_listing_params() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/eips?status=Approved").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_get_eip() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture.get("/api/eips/1559").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["title"], "Fee market change for ETH 1.0 chain");

    let (status, body) = fixture.get("/api/eips/EIP-721").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["number"], 721);

    let (status, body) = fixture.get("/api/eips/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = fixture.get("/api/eips/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_related_and_projects() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get("/api/eips/4844/related").await;
    assert_eq!(numbers(&body), vec![1559]);

    let (status, _) = fixture.get("/api/eips/9999/related").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = fixture.get("/api/eips/4337/projects").await;
    let ids: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["safe", "alchemy-account-kit"]);
}

#[tokio::test]
async fn test_projects() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get("/api/projects").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 8);

    let (_, body) = fixture.get("/api/projects?status=beta").await;
    assert_eq!(body["data"][0]["id"], "alchemy-account-kit");

    let (status, body) = fixture.get("/api/projects/geth").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["eipNumbers"], json!([1559, 4844, 7702]));

    let (status, _) = fixture.get("/api/projects/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = fixture.get("/api/projects/stats").await;
    assert_eq!(body["data"]["total"], 8);
}

#[tokio::test]
async fn test_metrics_are_cached_until_refresh() {
    let fixture = TestFixture::new().await;

    let (status, first) = fixture.get("/api/eips/1559/metrics").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["data"]["eipNumber"], 1559);
    assert_eq!(first["data"]["origin"], "synthetic");

    let rate = first["data"]["adoptionRate"].as_f64().unwrap();
    assert!((0.0..=100.0).contains(&rate));

    let (_, second) = fixture.get("/api/eips/1559/metrics").await;
    assert_eq!(first["data"], second["data"]);

    let (status, refreshed) = fixture
        .post("/api/eips/1559/metrics/refresh", json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(refreshed["data"]["eipNumber"], 1559);

    let (status, _) = fixture.get("/api/eips/9999/metrics").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_lifecycle() {
    let fixture = TestFixture::new().await;

    let (_, body) = fixture.get("/api/dashboard").await;
    assert_eq!(body["data"]["overview"]["status"], "idle");
    assert_eq!(body["data"]["polling"], false);

    fixture.dashboard.mount().await;

    let (_, body) = fixture.get("/api/dashboard").await;
    let data = &body["data"];
    assert_eq!(data["overview"]["status"], "success");
    assert_eq!(data["overview"]["data"]["stats"]["total"], 8);
    assert_eq!(data["liveMetrics"]["status"], "success");
    assert_eq!(data["liveMetrics"]["data"].as_array().unwrap().len(), 8);
    assert_eq!(data["polling"], true);
    assert_eq!(data["pollIntervalSecs"], 30);

    let (status, body) = fixture.post("/api/dashboard/refresh", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["loading"], false);

    fixture.dashboard.unmount();
    let (_, body) = fixture.get("/api/dashboard").await;
    assert_eq!(body["data"]["polling"], false);
}

#[tokio::test]
async fn test_assistant_without_provider() {
    let fixture = TestFixture::new().await;

    let (status, body) = fixture
        .post(
            "/api/assistant/chat",
            json!({
                "messages": [{"role": "user", "content": "Tell me about EIP-1559"}]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let reply = body["data"]["reply"].as_str().unwrap();
    assert!(reply.contains("1559"));

    let (status, body) = fixture
        .post("/api/assistant/chat", json!({ "messages": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let resp = fixture
        .client
        .post(fixture.url("/api/assistant/chat"))
        .header("content-type", "application/json")
        .body("{\"messages\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_cache_status_and_clear() {
    let fixture = TestFixture::new().await;

    fixture.get("/api/eips").await;
    fixture.get("/api/eips/20/metrics").await;

    let (_, body) = fixture.get("/api/cache").await;
    let caches = body["data"]["caches"].as_array().unwrap();
    assert_eq!(caches.len(), 3);
    assert_eq!(caches[0]["dataset"], "eips");
    assert_eq!(caches[0]["entries"], 1);
    assert_eq!(caches[0]["ttlSecs"], 300);
    assert_eq!(caches[2]["dataset"], "metrics");
    assert_eq!(caches[2]["entries"], 1);

    let (status, body) = fixture.post("/api/cache/clear", json!({})).await;
    assert_eq!(status, StatusCode::OK);
    for cache in body["data"]["caches"].as_array().unwrap() {
        assert_eq!(cache["entries"], 0);
    }

    // Next read reloads from the fallback
    let (_, body) = fixture.get("/api/eips").await;
    assert_eq!(numbers(&body).len(), 8);
}

#[tokio::test]
async fn test_fallback_override_from_data_dir() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let subset: Vec<_> = fallback_eips().into_iter().take(2).collect();
    std::fs::write(
        temp_dir.path().join("eips.json"),
        serde_json::to_string(&subset).unwrap(),
    )
    .unwrap();

    let config = Config {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..test_config()
    };
    let fixture = TestFixture::with_config(config).await;

    let (_, body) = fixture.get("/api/eips").await;
    assert_eq!(numbers(&body), vec![1, 20]);

    // Projects have no override and keep the bundled set
    let (_, body) = fixture.get("/api/projects").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 8);
}

#[test]
fn test_malformed_override_fails_startup() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    std::fs::write(temp_dir.path().join("projects.json"), "{not json").unwrap();

    let config = Config {
        data_dir: Some(temp_dir.path().to_path_buf()),
        ..test_config()
    };
    assert!(AppState::build(&config, Arc::new(SystemClock)).is_err());
}
