//! Catalog client trait - Abstraction over the catalog transport
//!
//! The mapping layer only talks to the catalog through this trait:
//! - HTTP against the live charm store (`HttpCatalogClient`)
//! - In-memory fixtures (tests)

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;
use crate::query::SearchParams;

/// Trait for catalog transports
///
/// Implementations own retries, timeouts and authentication. Errors they
/// return are propagated to callers unchanged.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Run a search, returning one raw metadata payload per result, in order
    async fn search(&self, params: &SearchParams) -> Result<Vec<Value>>;

    /// Fetch the requested metadata sections for one entity
    async fn fetch_metadata(&self, id: &str, includes: &[&str]) -> Result<Value>;

    /// URL of a file inside an entity's archive
    fn file_url(&self, url: &str, path: &str) -> String;

    /// Fetch the text found at a URL
    async fn fetch_text(&self, url: &str) -> Result<String>;

    /// Client identifier for logging/debugging
    fn name(&self) -> &'static str;
}

/// Strip the `cs:` scheme from a catalog identifier
pub fn strip_scheme(id: &str) -> &str {
    id.strip_prefix("cs:").unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_scheme() {
        assert_eq!(strip_scheme("cs:trusty/mysql-38"), "trusty/mysql-38");
        assert_eq!(strip_scheme("trusty/mysql-38"), "trusty/mysql-38");
        assert_eq!(strip_scheme("~bob/xenial/app-1"), "~bob/xenial/app-1");
    }
}
