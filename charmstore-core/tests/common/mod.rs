//! Shared test utilities: fixtures and an in-memory catalog client

#![allow(dead_code)]

use async_trait::async_trait;
use charmstore_core::{CatalogClient, CatalogError, Result, SearchParams};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Load a JSON fixture from `tests/fixtures/`
pub fn fixture(name: &str) -> Value {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {e}", path.display()));
    serde_json::from_str(&content).expect("Fixture should be valid JSON")
}

/// Fixture with its identity rewritten, for building extra revisions
pub fn with_id(mut payload: Value, id: &str, revision: u64) -> Value {
    payload["id"]["Id"] = Value::from(id);
    payload["id"]["Revision"] = Value::from(revision);
    payload
}

/// One recorded collaborator call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Search(SearchParams),
    FetchMetadata { id: String, includes: Vec<String> },
    FetchText(String),
}

/// In-memory catalog client that records every call
#[derive(Default)]
pub struct MockClient {
    pub search_results: Vec<Value>,
    pub metadata: HashMap<String, Value>,
    pub files: HashMap<String, String>,
    calls: Mutex<Vec<Call>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search_results(mut self, results: Vec<Value>) -> Self {
        self.search_results = results;
        self
    }

    /// Register metadata under an identifier without the `cs:` scheme
    pub fn with_metadata(mut self, id: &str, payload: Value) -> Self {
        self.metadata.insert(id.to_string(), payload);
        self
    }

    pub fn with_file(mut self, url: &str, content: &str) -> Self {
        self.files.insert(url.to_string(), content.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn metadata_fetches(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::FetchMetadata { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl CatalogClient for MockClient {
    async fn search(&self, params: &SearchParams) -> Result<Vec<Value>> {
        self.record(Call::Search(params.clone()));
        Ok(self.search_results.clone())
    }

    async fn fetch_metadata(&self, id: &str, includes: &[&str]) -> Result<Value> {
        self.record(Call::FetchMetadata {
            id: id.to_string(),
            includes: includes.iter().map(|s| s.to_string()).collect(),
        });
        self.metadata
            .get(id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    fn file_url(&self, url: &str, path: &str) -> String {
        format!("mock://{url}/archive/{path}")
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.record(Call::FetchText(url.to_string()));
        self.files
            .get(url)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(url.to_string()))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
