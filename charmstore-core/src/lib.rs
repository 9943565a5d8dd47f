//! Charm store catalog client
//!
//! Searches the remote catalog and maps its JSON answers into typed
//! entities.
//!
//! # Architecture
//!
//! ```text
//! caller
//!   │
//!   ▼
//! CharmStore ──► SearchQuery ──► SearchParams
//!   │
//!   ▼
//! CatalogClient (HTTP / mock)
//!   │  raw JSON payloads
//!   ▼
//! Entity / Charm ::from_data
//! ```

pub mod charm;
pub mod client;
pub mod config;
pub mod entity;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod query;
pub mod store;

pub use charm::{ActionSpec, Charm, ConfigOption, RelatedCharms, Relation, RelationKind};
pub use client::CatalogClient;
pub use config::StoreConfig;
pub use entity::{CatalogEntity, Entity};
pub use error::{CatalogError, Result};
#[cfg(feature = "http")]
pub use http::HttpCatalogClient;
pub use query::{DocType, OneOrMany, SearchParams, SearchQuery, AVAILABLE_INCLUDES};
pub use store::CharmStore;
