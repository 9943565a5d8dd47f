//! HTTP client for the charm store v4 API
//!
//! Implements [`CatalogClient`] with plain GET requests:
//! - `{api}/search?...` for searches
//! - `{api}/{id}/meta/any?include=...` for entity metadata
//! - `{api}/{id}/archive/{path}` for archive files

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, trace};

use crate::client::{strip_scheme, CatalogClient};
use crate::config::StoreConfig;
use crate::error::{CatalogError, Result};
use crate::query::SearchParams;

/// Charm store API client
pub struct HttpCatalogClient {
    client: Client,
    api_url: String,
}

impl HttpCatalogClient {
    /// Create a client from configuration
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.effective_user_agent())
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are made against
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value> {
        debug!("GET {} ({} query params)", url, query.len());

        let response = self.client.get(url).query(query).send().await?;
        let response = check_status(url, response).await?;

        Ok(response.json().await?)
    }
}

async fn check_status(url: &str, response: reqwest::Response) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(CatalogError::NotFound(url.to_string()));
    }

    let message = response.text().await.unwrap_or_default();
    Err(CatalogError::Server {
        status: status.as_u16(),
        message,
    })
}

/// Unwrap the `Meta` object the catalog nests metadata under
fn into_meta(mut result: Value) -> Value {
    match result.get_mut("Meta").map(Value::take) {
        Some(meta) => meta,
        None => result,
    }
}

#[async_trait]
impl CatalogClient for HttpCatalogClient {
    async fn search(&self, params: &SearchParams) -> Result<Vec<Value>> {
        let url = format!("{}/search", self.api_url);
        let mut body = self.get_json(&url, &params.query_pairs()).await?;

        let results = match body.get_mut("Results").map(Value::take) {
            Some(Value::Array(results)) => results,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(CatalogError::InvalidPayload(format!(
                    "Search results must be a list, got: {other}"
                )))
            }
        };

        debug!("Search returned {} result(s)", results.len());
        Ok(results.into_iter().map(into_meta).collect())
    }

    async fn fetch_metadata(&self, id: &str, includes: &[&str]) -> Result<Value> {
        let url = format!("{}/{}/meta/any", self.api_url, strip_scheme(id));
        let query: Vec<(&str, String)> = includes
            .iter()
            .map(|include| ("include", include.to_string()))
            .collect();

        let body = self.get_json(&url, &query).await?;
        trace!("Metadata for {}: {}", id, body);

        Ok(into_meta(body))
    }

    fn file_url(&self, url: &str, path: &str) -> String {
        format!(
            "{}/{}/archive/{}",
            self.api_url,
            strip_scheme(url),
            path.trim_start_matches('/')
        )
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let response = check_status(url, response).await?;

        Ok(response.text().await?)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
