//! JSON-over-HTTP primary source.

use std::marker::PhantomData;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use super::{DataSource, SourceError};

pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, SourceError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("eip-dashboard-backend/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| SourceError::Http(e.to_string()))
}

/// Map a non-success status to a [`SourceError`], reading the body for context.
pub(super) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, SourceError> {
    match resp.status() {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SourceError::Unauthorized),
        StatusCode::TOO_MANY_REQUESTS => Err(SourceError::RateLimited),
        status if !status.is_success() => {
            let body = resp.text().await.unwrap_or_default();
            Err(SourceError::Status {
                status: status.as_u16(),
                body,
            })
        }
        _ => Ok(resp),
    }
}

/// Loads a JSON array of records from a fixed URL.
pub struct HttpJsonSource<T> {
    name: String,
    client: reqwest::Client,
    url: String,
    _records: PhantomData<fn() -> T>,
}

impl<T> HttpJsonSource<T> {
    pub fn new(name: impl Into<String>, client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client,
            url: url.into(),
            _records: PhantomData,
        }
    }
}

#[async_trait]
impl<T> DataSource<T> for HttpJsonSource<T>
where
    T: DeserializeOwned + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn load(&self) -> Result<Vec<T>, SourceError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let resp = check_status(resp).await?;

        let raw = resp
            .text()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        serde_json::from_str(&raw)
            .map_err(|e| SourceError::InvalidResponse(format!("json parse failed: {e}")))
    }
}
