//! Search query building
//!
//! Turns caller-supplied criteria (free text, relation interfaces, tags,
//! flags) into the normalized [`SearchParams`] handed to a
//! [`CatalogClient`](crate::client::CatalogClient).

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CatalogError, Result};

/// Every metadata section the catalog can return for an entity
pub const AVAILABLE_INCLUDES: [&str; 17] = [
    "bundle-machine-count",
    "bundle-metadata",
    "bundle-unit-count",
    "bundles-containing",
    "charm-actions",
    "charm-config",
    "charm-metadata",
    "common-info",
    "extra-info",
    "revision-info",
    "stats",
    "supported-series",
    "manifest",
    "tags",
    "promulgated",
    "perm",
    "id",
];

/// A relation filter given either as one interface or a list of them
///
/// Accepts:
/// - `"http"` - a single interface
/// - `["http", "mysql"]` - several interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    /// Normalize into a list; a single value becomes a one-element list
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            OneOrMany::One(value) => value.is_empty(),
            OneOrMany::Many(values) => values.is_empty(),
        }
    }
}

impl Default for OneOrMany {
    fn default() -> Self {
        OneOrMany::Many(Vec::new())
    }
}

impl From<&str> for OneOrMany {
    fn from(value: &str) -> Self {
        OneOrMany::One(value.to_string())
    }
}

impl From<String> for OneOrMany {
    fn from(value: String) -> Self {
        OneOrMany::One(value)
    }
}

impl From<Vec<String>> for OneOrMany {
    fn from(values: Vec<String>) -> Self {
        OneOrMany::Many(values)
    }
}

impl From<Vec<&str>> for OneOrMany {
    fn from(values: Vec<&str>) -> Self {
        OneOrMany::Many(values.into_iter().map(str::to_string).collect())
    }
}

impl From<&[&str]> for OneOrMany {
    fn from(values: &[&str]) -> Self {
        OneOrMany::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for OneOrMany {
    fn from(values: [&str; N]) -> Self {
        OneOrMany::Many(values.iter().map(|v| v.to_string()).collect())
    }
}

impl TryFrom<&Value> for OneOrMany {
    type Error = CatalogError;

    fn try_from(value: &Value) -> Result<Self> {
        match value {
            Value::String(s) => Ok(OneOrMany::One(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(CatalogError::bad_interfaces)
                })
                .collect::<Result<Vec<_>>>()
                .map(OneOrMany::Many),
            _ => Err(CatalogError::bad_interfaces()),
        }
    }
}

impl TryFrom<Value> for OneOrMany {
    type Error = CatalogError;

    fn try_from(value: Value) -> Result<Self> {
        OneOrMany::try_from(&value)
    }
}

/// Kind of document to restrict a search to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocType {
    Charm,
    Bundle,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::Charm => "charm",
            DocType::Bundle => "bundle",
        }
    }
}

/// Normalized search parameters, as consumed by the catalog's search endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchParams {
    pub text: Option<String>,
    pub includes: Vec<String>,
    pub doc_type: Option<DocType>,
    pub limit: Option<u32>,
    pub autocomplete: bool,
    pub promulgated_only: bool,
    pub tags: Vec<String>,
    pub sort: Option<String>,
    pub owner: Option<String>,
    pub series: Vec<String>,
    /// Interfaces the result must require; empty means no filter
    pub requires: Vec<String>,
    /// Interfaces the result must provide; empty means no filter
    pub provides: Vec<String>,
}

impl SearchParams {
    /// Render as URL query pairs in a stable order
    ///
    /// Relation filters repeat their key once per interface, which is how
    /// the catalog combines several values for one filter.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some(ref text) = self.text {
            pairs.push(("text", text.clone()));
        }
        for include in &self.includes {
            pairs.push(("include", include.clone()));
        }
        if let Some(doc_type) = self.doc_type {
            pairs.push(("type", doc_type.as_str().to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        if self.autocomplete {
            pairs.push(("autocomplete", "1".to_string()));
        }
        if self.promulgated_only {
            pairs.push(("promulgated", "1".to_string()));
        }
        if !self.tags.is_empty() {
            pairs.push(("tags", self.tags.join(",")));
        }
        if let Some(ref sort) = self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(ref owner) = self.owner {
            pairs.push(("owner", owner.clone()));
        }
        if !self.series.is_empty() {
            pairs.push(("series", self.series.join(",")));
        }
        for interface in &self.requires {
            pairs.push(("requires", interface.clone()));
        }
        for interface in &self.provides {
            pairs.push(("provides", interface.clone()));
        }

        pairs
    }
}

/// Builder for a catalog search
///
/// ```
/// use charmstore_core::query::SearchQuery;
///
/// let params = SearchQuery::new()
///     .text("wordpress")
///     .requires("mysql")
///     .limit(10)
///     .build();
/// assert_eq!(params.requires, vec!["mysql".to_string()]);
/// assert_eq!(params.includes.len(), 17);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    text: Option<String>,
    includes: Option<Vec<String>>,
    doc_type: Option<DocType>,
    limit: Option<u32>,
    autocomplete: bool,
    promulgated_only: bool,
    tags: Vec<String>,
    sort: Option<String>,
    owner: Option<String>,
    series: Vec<String>,
    requires: Vec<String>,
    provides: Vec<String>,
}

impl SearchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Restrict the metadata sections returned; empty falls back to all of them
    pub fn includes<I, S>(mut self, includes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.includes = Some(includes.into_iter().map(Into::into).collect());
        self
    }

    pub fn doc_type(mut self, doc_type: DocType) -> Self {
        self.doc_type = Some(doc_type);
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn autocomplete(mut self, autocomplete: bool) -> Self {
        self.autocomplete = autocomplete;
        self
    }

    pub fn promulgated_only(mut self, promulgated_only: bool) -> Self {
        self.promulgated_only = promulgated_only;
        self
    }

    pub fn tags(mut self, tags: impl Into<OneOrMany>) -> Self {
        self.tags = tags.into().into_vec();
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    pub fn series(mut self, series: impl Into<OneOrMany>) -> Self {
        self.series = series.into().into_vec();
        self
    }

    pub fn requires(mut self, interfaces: impl Into<OneOrMany>) -> Self {
        self.requires = normalize_interfaces(interfaces.into());
        self
    }

    pub fn provides(mut self, interfaces: impl Into<OneOrMany>) -> Self {
        self.provides = normalize_interfaces(interfaces.into());
        self
    }

    /// Assemble the parameter set handed to the catalog
    pub fn build(self) -> SearchParams {
        let includes = match self.includes {
            Some(includes) if !includes.is_empty() => includes,
            _ => default_includes(),
        };

        SearchParams {
            text: self.text,
            includes,
            doc_type: self.doc_type,
            limit: self.limit,
            autocomplete: self.autocomplete,
            promulgated_only: self.promulgated_only,
            tags: self.tags,
            sort: self.sort,
            owner: self.owner,
            series: self.series,
            requires: self.requires,
            provides: self.provides,
        }
    }
}

/// The full include vocabulary as owned strings
pub fn default_includes() -> Vec<String> {
    AVAILABLE_INCLUDES.iter().map(|s| s.to_string()).collect()
}

/// Build a relation-filtered search
pub fn interfaces(
    requires: impl Into<OneOrMany>,
    provides: impl Into<OneOrMany>,
    limit: Option<u32>,
) -> SearchQuery {
    let mut query = SearchQuery::new().requires(requires).provides(provides);
    query.limit = limit;
    query
}

/// Same as [`interfaces`], validating untyped JSON arguments first
pub fn interfaces_from_values(
    requires: &Value,
    provides: &Value,
    limit: Option<u32>,
) -> Result<SearchQuery> {
    let requires = optional_filter(requires)?;
    let provides = optional_filter(provides)?;
    Ok(interfaces(requires, provides, limit))
}

fn optional_filter(value: &Value) -> Result<OneOrMany> {
    match value {
        Value::Null => Ok(OneOrMany::default()),
        other => OneOrMany::try_from(other),
    }
}

// An empty string is "no filter", same as an empty list
fn normalize_interfaces(interfaces: OneOrMany) -> Vec<String> {
    if interfaces.is_empty() {
        return Vec::new();
    }
    interfaces.into_vec()
}
