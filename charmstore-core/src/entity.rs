//! Catalog entities
//!
//! An [`Entity`] is one catalog item (charm or bundle) at a specific
//! revision. Every typed field is a projection of the raw payload the
//! catalog returned, which is kept verbatim in [`Entity::raw`].

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use tracing::debug;

use crate::client::{strip_scheme, CatalogClient};
use crate::error::{CatalogError, Result};
use crate::query::AVAILABLE_INCLUDES;

/// Behaviour shared by every mapped catalog type
///
/// `revisions` and `fetch` build values of the implementing type, so a
/// charm's revisions are charms and an entity's revisions are entities.
#[async_trait]
pub trait CatalogEntity: Default + Send + Sync + Sized {
    /// Lower-case kind name used in messages
    const KIND: &'static str;

    /// Project a raw payload onto this value
    fn load(&mut self, data: Value) -> Result<()>;

    /// The base entity fields
    fn entity(&self) -> &Entity;

    /// Build a value from a payload without touching the catalog
    fn from_data(data: Value) -> Result<Self> {
        let mut item = Self::default();
        item.load(data)?;
        Ok(item)
    }

    /// Fetch every metadata section for `id` and load it
    async fn fetch(client: &dyn CatalogClient, id: &str) -> Result<Self> {
        let id = strip_scheme(id);
        debug!("Fetching {} {} via {}", Self::KIND, id, client.name());

        let data = client.fetch_metadata(id, &AVAILABLE_INCLUDES).await?;
        Self::from_data(data)
    }

    /// Fetch each revision listed in `revision-info`, one request per revision
    async fn revisions(&self, client: &dyn CatalogClient) -> Result<Vec<Self>> {
        let ids = self.entity().revision_ids();
        let mut revisions = Vec::with_capacity(ids.len());

        for id in ids {
            revisions.push(Self::fetch(client, &id).await?);
        }

        Ok(revisions)
    }

    /// Fetch the text of a file listed in the manifest
    async fn file(&self, client: &dyn CatalogClient, path: &str) -> Result<String> {
        self.entity().fetch_file(client, Self::KIND, path).await
    }
}

/// One catalog item at a specific revision
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entity {
    /// Canonical identifier, e.g. `cs:trusty/mysql-38`
    pub id: Option<String>,
    pub name: Option<String>,
    pub owner: Option<String>,
    pub series: Option<String>,
    pub revision: u64,
    /// Identifier without the `cs:` scheme
    pub url: Option<String>,
    pub tags: Vec<String>,
    /// Whether the catalog promulgates this entity
    pub approved: bool,
    /// Upstream source repository
    pub source: Option<String>,
    /// File names from the manifest, in manifest order
    pub files: Vec<String>,
    pub stats: Map<String, Value>,
    /// The payload exactly as loaded
    #[serde(skip)]
    pub raw: Value,
}

impl Entity {
    /// Identifiers listed under `revision-info.Revisions`
    pub fn revision_ids(&self) -> Vec<String> {
        self.raw
            .get("revision-info")
            .and_then(|info| info.get("Revisions"))
            .and_then(Value::as_array)
            .map(|revisions| revisions.iter().filter_map(reference_id).collect())
            .unwrap_or_default()
    }

    /// Whether `path` is listed in the manifest
    pub fn has_file(&self, path: &str) -> bool {
        self.files.iter().any(|f| f == path)
    }

    /// Fetch a manifest file, naming `kind` in the error when it is not listed
    pub async fn fetch_file(
        &self,
        client: &dyn CatalogClient,
        kind: &'static str,
        path: &str,
    ) -> Result<String> {
        if !self.has_file(path) {
            return Err(CatalogError::NotFoundInManifest {
                kind,
                path: path.to_string(),
            });
        }

        let url = self.url.as_deref().ok_or_else(|| {
            CatalogError::InvalidPayload(format!("{kind} has no identifier to fetch {path} from"))
        })?;

        client.fetch_text(&client.file_url(url, path)).await
    }
}

#[async_trait]
impl CatalogEntity for Entity {
    const KIND: &'static str = "entity";

    fn load(&mut self, data: Value) -> Result<()> {
        let id = data.get("id");
        self.id = str_field(id, "Id");
        self.url = self.id.as_deref().map(|id| strip_scheme(id).to_string());
        self.name = str_field(id, "Name");
        self.owner = str_field(id, "User");
        self.revision = id
            .and_then(|id| id.get("Revision"))
            .and_then(Value::as_u64)
            .unwrap_or(0);
        self.series = str_field(id, "Series");

        // The live API answers the `tags` include under a lower-case key
        self.tags = ["Tags", "tags"]
            .iter()
            .find_map(|key| data.get(*key).and_then(|tags| tags.get("Tags")))
            .map(string_list)
            .unwrap_or_default();

        self.source = str_field(data.get("extra-info"), "bzr-url");

        self.files = data
            .get("manifest")
            .and_then(Value::as_array)
            .map(|manifest| {
                manifest
                    .iter()
                    .filter_map(|file| file.get("Name").and_then(Value::as_str))
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        self.approved = data
            .get("promulgated")
            .and_then(|p| p.get("Promulgated"))
            .and_then(Value::as_bool)
            .unwrap_or(false);

        self.stats = data
            .get("stats")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        self.raw = data;
        Ok(())
    }

    fn entity(&self) -> &Entity {
        self
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pretty = serde_json::to_string_pretty(&self.raw).map_err(|_| fmt::Error)?;
        f.write_str(&pretty)
    }
}

/// String value of `key` inside an optional object
pub(crate) fn str_field(section: Option<&Value>, key: &str) -> Option<String> {
    section
        .and_then(|s| s.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Strings of a JSON array, skipping anything else
pub(crate) fn string_list(value: &Value) -> Vec<String> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Identifier of a reference given either as a bare string or an object with `Id`
pub(crate) fn reference_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Object(obj) => obj.get("Id").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample_payload() -> Value {
        json!({
            "id": {
                "Id": "cs:trusty/mysql-38",
                "User": "",
                "Name": "mysql",
                "Revision": 38,
                "Series": "trusty"
            },
            "Tags": {"Tags": ["databases", "sql"]},
            "extra-info": {"bzr-url": "lp:charms/trusty/mysql"},
            "manifest": [
                {"Name": "metadata.yaml", "Size": 512},
                {"Name": "hooks/install", "Size": 128},
                {"Size": 3}
            ],
            "promulgated": {"Promulgated": true},
            "stats": {"ArchiveDownloadCount": 1200},
            "revision-info": {"Revisions": ["cs:trusty/mysql-38", "cs:trusty/mysql-37"]}
        })
    }

    #[test]
    fn test_load_projects_fields() {
        let entity = Entity::from_data(sample_payload()).unwrap();

        assert_eq!(entity.id.as_deref(), Some("cs:trusty/mysql-38"));
        assert_eq!(entity.url.as_deref(), Some("trusty/mysql-38"));
        assert_eq!(entity.name.as_deref(), Some("mysql"));
        assert_eq!(entity.owner.as_deref(), Some(""));
        assert_eq!(entity.revision, 38);
        assert_eq!(entity.series.as_deref(), Some("trusty"));
        assert_eq!(entity.tags, vec!["databases", "sql"]);
        assert_eq!(entity.source.as_deref(), Some("lp:charms/trusty/mysql"));
        assert_eq!(entity.files, vec!["metadata.yaml", "hooks/install"]);
        assert!(entity.approved);
        assert_eq!(entity.stats["ArchiveDownloadCount"], json!(1200));
        assert_eq!(entity.raw, sample_payload());
    }

    #[test]
    fn test_load_tolerates_missing_sections() {
        let entity = Entity::from_data(json!({})).unwrap();

        assert_eq!(entity.id, None);
        assert_eq!(entity.url, None);
        assert_eq!(entity.revision, 0);
        assert!(entity.tags.is_empty());
        assert!(entity.files.is_empty());
        assert!(!entity.approved);
        assert_eq!(entity.source, None);
        assert_eq!(entity.raw, json!({}));
    }

    #[test]
    fn test_lowercase_tags_section() {
        let entity = Entity::from_data(json!({"tags": {"Tags": ["ops"]}})).unwrap();
        assert_eq!(entity.tags, vec!["ops"]);

        // An upper-case section without an inner list does not hide the lower-case one
        let entity =
            Entity::from_data(json!({"Tags": {}, "tags": {"Tags": ["ops", "db"]}})).unwrap();
        assert_eq!(entity.tags, vec!["ops", "db"]);
    }

    #[test]
    fn test_load_is_idempotent() {
        let mut first = Entity::default();
        first.load(sample_payload()).unwrap();
        let snapshot = first.clone();
        first.load(sample_payload()).unwrap();
        assert_eq!(first, snapshot);
    }

    #[test]
    fn test_revision_ids() {
        let entity = Entity::from_data(sample_payload()).unwrap();
        assert_eq!(
            entity.revision_ids(),
            vec!["cs:trusty/mysql-38", "cs:trusty/mysql-37"]
        );

        let bare = Entity::from_data(json!({"id": {"Id": "cs:foo-1"}})).unwrap();
        assert!(bare.revision_ids().is_empty());
    }

    #[test]
    fn test_display_is_pretty_raw() {
        let entity = Entity::from_data(json!({"id": {"Id": "cs:foo-1"}})).unwrap();
        let rendered = entity.to_string();
        assert!(rendered.contains("\n"));
        let reparsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(reparsed, entity.raw);
    }

    #[test]
    fn test_reference_id() {
        assert_eq!(reference_id(&json!("cs:a-1")), Some("cs:a-1".to_string()));
        assert_eq!(reference_id(&json!({"Id": "cs:b-2"})), Some("cs:b-2".to_string()));
        assert_eq!(reference_id(&json!(5)), None);
    }
}
