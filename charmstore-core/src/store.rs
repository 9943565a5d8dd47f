//! Catalog facade
//!
//! [`CharmStore`] ties the query builder, a [`CatalogClient`] and the
//! mappers together. Nothing is cached: every call goes back to the
//! catalog, and traversals issue one request per hydrated entity.

use std::sync::Arc;
use tracing::debug;

use crate::charm::{Charm, RelatedCharms};
use crate::client::CatalogClient;
use crate::entity::{CatalogEntity, Entity};
use crate::error::Result;
use crate::query::{self, OneOrMany, SearchQuery};

/// Entry point for searching and looking up catalog entities
#[derive(Clone)]
pub struct CharmStore {
    client: Arc<dyn CatalogClient>,
}

impl CharmStore {
    /// Create a store over any catalog client
    pub fn new(client: Arc<dyn CatalogClient>) -> Self {
        Self { client }
    }

    /// Create a store talking HTTP to the configured catalog
    #[cfg(feature = "http")]
    pub fn from_config(config: &crate::config::StoreConfig) -> Result<Self> {
        let client = crate::http::HttpCatalogClient::new(config)?;
        debug!("Using catalog at {}", client.api_url());
        Ok(Self::new(Arc::new(client)))
    }

    pub fn client(&self) -> &dyn CatalogClient {
        self.client.as_ref()
    }

    /// Search the catalog, mapping each result to a [`Charm`] in response order
    ///
    /// A result without `charm-metadata` fails the whole search.
    pub async fn search(&self, query: SearchQuery) -> Result<Vec<Charm>> {
        let params = query.build();
        let results = self.client.search(&params).await?;
        debug!("Mapping {} search result(s)", results.len());

        results.into_iter().map(Charm::from_data).collect()
    }

    /// Search the catalog, mapping each result to a plain [`Entity`]
    ///
    /// Unlike [`CharmStore::search`] this accepts bundles.
    pub async fn search_entities(&self, query: SearchQuery) -> Result<Vec<Entity>> {
        let params = query.build();
        let results = self.client.search(&params).await?;
        debug!("Mapping {} search result(s) as entities", results.len());

        results.into_iter().map(Entity::from_data).collect()
    }

    /// Promulgated charms only
    pub async fn approved(&self) -> Result<Vec<Charm>> {
        self.search(SearchQuery::new().promulgated_only(true)).await
    }

    /// Charms matching relation interface filters
    pub async fn interfaces(
        &self,
        requires: impl Into<OneOrMany>,
        provides: impl Into<OneOrMany>,
        limit: Option<u32>,
    ) -> Result<Vec<Charm>> {
        self.search(query::interfaces(requires, provides, limit)).await
    }

    /// Charms requiring any of `interfaces`
    pub async fn requires(&self, interfaces: impl Into<OneOrMany>) -> Result<Vec<Charm>> {
        self.interfaces(interfaces, OneOrMany::default(), None).await
    }

    /// Charms providing any of `interfaces`
    pub async fn provides(&self, interfaces: impl Into<OneOrMany>) -> Result<Vec<Charm>> {
        self.interfaces(OneOrMany::default(), interfaces, None).await
    }

    /// Look up any entity (charm or bundle) by identifier
    pub async fn entity(&self, id: &str) -> Result<Entity> {
        Entity::fetch(self.client(), id).await
    }

    /// Look up a charm by identifier
    pub async fn charm(&self, id: &str) -> Result<Charm> {
        Charm::fetch(self.client(), id).await
    }

    /// Fetch every revision of `item`, as the same type
    pub async fn revisions<T: CatalogEntity>(&self, item: &T) -> Result<Vec<T>> {
        item.revisions(self.client()).await
    }

    /// Hydrate the charms related to `charm`
    pub async fn related(&self, charm: &Charm) -> Result<RelatedCharms> {
        charm.related(self.client()).await
    }

    /// Fetch the text of a file in `item`'s archive
    pub async fn file<T: CatalogEntity>(&self, item: &T, path: &str) -> Result<String> {
        item.file(self.client(), path).await
    }
}
