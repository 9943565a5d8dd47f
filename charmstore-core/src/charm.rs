//! Charm (package) mapping
//!
//! A [`Charm`] is an [`Entity`] whose payload carries a `charm-metadata`
//! section. On top of the base fields it exposes relation declarations,
//! the config schema, the action schema and the related-charm graph.
//!
//! Relation attribute keys are lower-cased on load: the catalog answers
//! `{"Interface": "http"}`, callers always see `{"interface": "http"}`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::debug;

use crate::client::CatalogClient;
use crate::entity::{reference_id, str_field, string_list, CatalogEntity, Entity};
use crate::error::{CatalogError, Result};

/// Relation name -> lower-cased attribute map
pub type RelationMap = BTreeMap<String, Map<String, Value>>;

/// Relation kind -> interface -> related charms
pub type RelatedCharms = BTreeMap<String, BTreeMap<String, Vec<Charm>>>;

/// Which side of a relation a declaration sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Provides,
    Requires,
    Peers,
}

impl RelationKind {
    pub const ALL: [RelationKind; 3] = [
        RelationKind::Provides,
        RelationKind::Requires,
        RelationKind::Peers,
    ];

    /// Key of this kind inside `charm-metadata`
    pub fn metadata_key(&self) -> &'static str {
        match self {
            RelationKind::Provides => "Provides",
            RelationKind::Requires => "Requires",
            RelationKind::Peers => "Peers",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::Provides => "provides",
            RelationKind::Requires => "requires",
            RelationKind::Peers => "peers",
        }
    }
}

/// A relation declaration, read from the normalized attribute map
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub optional: bool,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// One configuration option from `charm-config`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigOption {
    #[serde(rename = "Type", default)]
    pub option_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub default: Option<Value>,
}

/// One action from `charm-actions`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ActionSpec {
    #[serde(default)]
    pub description: Option<String>,
    /// JSON schema of the action parameters
    #[serde(default)]
    pub params: Option<Value>,
}

/// A charm at a specific revision
#[derive(Clone, Default, PartialEq, Serialize)]
pub struct Charm {
    #[serde(flatten)]
    pub entity: Entity,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub subordinate: bool,
    pub terms: Vec<String>,
    pub provides: RelationMap,
    pub requires: RelationMap,
    pub peers: RelationMap,
    /// Action name -> action schema
    pub actions: Map<String, Value>,
    /// Option name -> option schema
    pub config: Map<String, Value>,
    /// Bundles containing this charm; not populated by `load`
    pub bundles: Vec<Entity>,
}

impl Charm {
    /// Relation declarations of one kind
    pub fn relations(&self, kind: RelationKind) -> &RelationMap {
        match kind {
            RelationKind::Provides => &self.provides,
            RelationKind::Requires => &self.requires,
            RelationKind::Peers => &self.peers,
        }
    }

    /// Typed view of one relation declaration
    pub fn relation(&self, kind: RelationKind, name: &str) -> Result<Option<Relation>> {
        self.relations(kind)
            .get(name)
            .map(typed)
            .transpose()
    }

    /// Typed view of one config option
    pub fn config_option(&self, name: &str) -> Result<Option<ConfigOption>> {
        self.config.get(name).map(typed_value).transpose()
    }

    /// Typed view of one action
    pub fn action(&self, name: &str) -> Result<Option<ActionSpec>> {
        self.actions.get(name).map(typed_value).transpose()
    }

    /// Every interface named by a relation of any kind
    pub fn interfaces(&self) -> BTreeSet<String> {
        RelationKind::ALL
            .iter()
            .flat_map(|kind| self.relations(*kind).values())
            .filter_map(|attrs| attrs.get("interface").and_then(Value::as_str))
            .map(str::to_string)
            .collect()
    }

    /// Hydrate every charm listed under `charm-related`
    ///
    /// Each referenced identifier costs one metadata request. Related charms
    /// are not expanded further.
    pub async fn related(&self, client: &dyn CatalogClient) -> Result<RelatedCharms> {
        let mut related = RelatedCharms::new();

        let Some(data) = self.entity.raw.get("charm-related").and_then(Value::as_object) else {
            return Ok(related);
        };

        for (relation, interfaces) in data {
            let bucket = related.entry(relation.to_lowercase()).or_default();

            let Some(interfaces) = interfaces.as_object() else {
                continue;
            };

            for (interface, charms) in interfaces {
                let ids: Vec<String> = charms
                    .as_array()
                    .map(|charms| charms.iter().filter_map(reference_id).collect())
                    .unwrap_or_default();

                debug!("Hydrating {} charm(s) related via {}", ids.len(), interface);

                let mut hydrated = Vec::with_capacity(ids.len());
                for id in ids {
                    hydrated.push(Charm::fetch(client, &id).await?);
                }
                bucket.insert(interface.clone(), hydrated);
            }
        }

        Ok(related)
    }
}

#[async_trait]
impl CatalogEntity for Charm {
    const KIND: &'static str = "charm";

    fn load(&mut self, data: Value) -> Result<()> {
        if !data.get("charm-metadata").is_some_and(Value::is_object) {
            return Err(CatalogError::charm_not_found());
        }

        self.entity.load(data)?;

        let raw = &self.entity.raw;
        let metadata = raw.get("charm-metadata");

        self.description = str_field(metadata, "Description");
        self.summary = str_field(metadata, "Summary");
        self.subordinate = metadata
            .and_then(|m| m.get("Subordinate"))
            .and_then(Value::as_bool)
            .unwrap_or(false);
        self.terms = metadata
            .and_then(|m| m.get("Terms"))
            .map(string_list)
            .unwrap_or_default();

        self.provides = normalize_relations(metadata, RelationKind::Provides);
        self.requires = normalize_relations(metadata, RelationKind::Requires);
        self.peers = normalize_relations(metadata, RelationKind::Peers);

        // Absent or empty sections keep whatever was there before
        if let Some(actions) = non_empty_section(raw, "charm-actions", "ActionSpecs") {
            self.actions = actions;
        }
        if let Some(options) = non_empty_section(raw, "charm-config", "Options") {
            self.config = options;
        }

        Ok(())
    }

    fn entity(&self) -> &Entity {
        &self.entity
    }
}

impl AsRef<Entity> for Charm {
    fn as_ref(&self) -> &Entity {
        &self.entity
    }
}

impl fmt::Display for Charm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entity, f)
    }
}

impl fmt::Debug for Charm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Charm {}>", self.entity.id.as_deref().unwrap_or("?"))
    }
}

fn normalize_relations(metadata: Option<&Value>, kind: RelationKind) -> RelationMap {
    metadata
        .and_then(|m| m.get(kind.metadata_key()))
        .and_then(Value::as_object)
        .map(|relations| {
            relations
                .iter()
                .map(|(name, attrs)| (name.clone(), lowercase_keys(attrs)))
                .collect()
        })
        .unwrap_or_default()
}

fn lowercase_keys(attrs: &Value) -> Map<String, Value> {
    attrs
        .as_object()
        .map(|attrs| {
            attrs
                .iter()
                .map(|(key, value)| (key.to_lowercase(), value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty_section(raw: &Value, section: &str, key: &str) -> Option<Map<String, Value>> {
    raw.get(section)
        .and_then(|s| s.get(key))
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
        .cloned()
}

fn typed<T: serde::de::DeserializeOwned>(attrs: &Map<String, Value>) -> Result<T> {
    Ok(serde_json::from_value(Value::Object(attrs.clone()))?)
}

fn typed_value<T: serde::de::DeserializeOwned>(value: &Value) -> Result<T> {
    Ok(serde_json::from_value(value.clone())?)
}
