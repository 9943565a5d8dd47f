//! Error types for the catalog client

use thiserror::Error;

/// Catalog client error
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Caller supplied a malformed search argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested file is not listed in the entity's manifest
    #[error("No such file in {kind}: {path}")]
    NotFoundInManifest { kind: &'static str, path: String },

    /// Payload is missing a section required by the mapper
    #[error("{0}")]
    InvalidPayload(String),

    /// Catalog reported the resource as missing
    #[error("Not found in catalog: {0}")]
    NotFound(String),

    /// Catalog returned a non-success status
    #[error("Catalog error {status}: {message}")]
    Server { status: u16, message: String },

    /// HTTP request failed
    #[cfg(feature = "http")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CatalogError {
    /// The relation filter error raised by the query builder
    pub fn bad_interfaces() -> Self {
        CatalogError::InvalidArgument("requires/provides must be a string or list".to_string())
    }

    /// The error raised when a payload carries no `charm-metadata`
    pub fn charm_not_found() -> Self {
        CatalogError::InvalidPayload("Not a valid charm payload".to_string())
    }
}

/// Result type for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_error_names_kind_and_path() {
        let err = CatalogError::NotFoundInManifest {
            kind: "charm",
            path: "nope.txt".to_string(),
        };
        assert_eq!(err.to_string(), "No such file in charm: nope.txt");
    }

    #[test]
    fn test_charm_not_found_message() {
        let err = CatalogError::charm_not_found();
        assert!(matches!(err, CatalogError::InvalidPayload(_)));
        assert_eq!(err.to_string(), "Not a valid charm payload");
    }
}
