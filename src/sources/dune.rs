//! Dune Analytics client used as the primary metrics source.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::http::check_status;
use super::SourceError;

/// A saved analytics query to execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub query_id: u64,
    pub limit: usize,
}

/// External analytics provider returning loosely typed rows.
#[async_trait]
pub trait AnalyticsSource: Send + Sync {
    async fn fetch(&self, query: &AnalyticsQuery) -> Result<Vec<Value>, SourceError>;
}

#[derive(Debug, Deserialize)]
struct QueryResults {
    #[serde(default)]
    result: Option<ResultRows>,
}

#[derive(Debug, Deserialize)]
struct ResultRows {
    #[serde(default)]
    rows: Vec<Value>,
}

pub struct DuneClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl DuneClient {
    pub fn new(client: reqwest::Client, api_key: String, base_url: String) -> Self {
        Self {
            client,
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl AnalyticsSource for DuneClient {
    async fn fetch(&self, query: &AnalyticsQuery) -> Result<Vec<Value>, SourceError> {
        let url = format!(
            "{}/query/{}/results",
            self.base_url.trim_end_matches('/'),
            query.query_id
        );

        let resp = self
            .client
            .get(url)
            .header("X-Dune-API-Key", &self.api_key)
            .query(&[("limit", query.limit)])
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let resp = check_status(resp).await?;

        let results: QueryResults = resp
            .json()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("json parse failed: {e}")))?;

        results
            .result
            .map(|r| r.rows)
            .ok_or_else(|| SourceError::InvalidResponse("missing result.rows".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::build_http_client;
    use axum::{extract::Path, http::HeaderMap, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::time::Duration;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api/v1", addr)
    }

    async fn results(Path(id): Path<u64>, headers: HeaderMap) -> (StatusCode, Json<Value>) {
        if headers.get("x-dune-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
            return (StatusCode::UNAUTHORIZED, Json(json!({"error": "invalid key"})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "query_id": id,
                "result": {
                    "rows": [
                        {"eip_number": 1559, "adoption_rate": 91.2},
                        {"eip_number": 4844, "adoption_rate": 66.0}
                    ]
                }
            })),
        )
    }

    fn app() -> Router {
        Router::new().route("/api/v1/query/{id}/results", get(results))
    }

    #[tokio::test]
    async fn test_fetch_rows() {
        let base = serve(app()).await;
        let client = DuneClient::new(
            build_http_client(Duration::from_secs(5)).unwrap(),
            "test-key".to_string(),
            base,
        );

        let rows = client
            .fetch(&AnalyticsQuery {
                query_id: 42,
                limit: 100,
            })
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["eip_number"], 1559);
    }

    #[tokio::test]
    async fn test_fetch_with_bad_key() {
        let base = serve(app()).await;
        let client = DuneClient::new(
            build_http_client(Duration::from_secs(5)).unwrap(),
            "wrong".to_string(),
            base,
        );

        let result = client
            .fetch(&AnalyticsQuery {
                query_id: 42,
                limit: 100,
            })
            .await;
        assert!(matches!(result, Err(SourceError::Unauthorized)));
    }
}
