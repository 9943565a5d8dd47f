//! Catalog CLI commands
//!
//! Provides commands for searching the charm store and inspecting
//! individual charms and bundles.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use charmstore_core::{
    CatalogEntity, Charm, CharmStore, DocType, Entity, RelationKind, SearchQuery,
};

#[derive(Subcommand, Debug)]
pub enum CatalogCommand {
    /// Search the catalog
    Search(SearchArgs),

    /// Show detailed information about a charm or bundle
    Show {
        /// Entity identifier (e.g., cs:trusty/wordpress-5)
        id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,

        /// Print the raw catalog payload
        #[clap(long)]
        raw: bool,
    },

    /// List every revision of an entity
    Revisions {
        /// Entity identifier
        id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// List charms related to a charm, by relation and interface
    Related {
        /// Charm identifier
        id: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print a file from an entity's archive
    File {
        /// Entity identifier
        id: String,

        /// Path inside the archive (must be listed in the manifest)
        path: String,
    },

    /// Print the resolved configuration
    Config,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Free text to search for
    pub text: Option<String>,

    /// Only charms requiring this interface (repeatable)
    #[clap(long)]
    pub requires: Vec<String>,

    /// Only charms providing this interface (repeatable)
    #[clap(long)]
    pub provides: Vec<String>,

    /// Only entities with this tag (repeatable)
    #[clap(long = "tags")]
    pub tags: Vec<String>,

    /// Only entities for this series
    #[clap(long)]
    pub series: Option<String>,

    /// Only entities owned by this user
    #[clap(long)]
    pub owner: Option<String>,

    /// Restrict to charms or bundles
    #[clap(long = "type", value_enum)]
    pub doc_type: Option<DocTypeArg>,

    /// Maximum number of results
    #[clap(long)]
    pub limit: Option<u32>,

    /// Sort order (e.g., -downloads)
    #[clap(long)]
    pub sort: Option<String>,

    /// Only promulgated entities
    #[clap(long)]
    pub approved: bool,

    /// Output results as JSON
    #[clap(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DocTypeArg {
    Charm,
    Bundle,
}

impl From<DocTypeArg> for DocType {
    fn from(arg: DocTypeArg) -> Self {
        match arg {
            DocTypeArg::Charm => DocType::Charm,
            DocTypeArg::Bundle => DocType::Bundle,
        }
    }
}

impl SearchArgs {
    fn to_query(&self) -> SearchQuery {
        let mut query = SearchQuery::new()
            .requires(self.requires.clone())
            .provides(self.provides.clone())
            .tags(self.tags.clone())
            .promulgated_only(self.approved);

        if let Some(ref text) = self.text {
            query = query.text(text);
        }
        if let Some(ref series) = self.series {
            query = query.series(series.as_str());
        }
        if let Some(ref owner) = self.owner {
            query = query.owner(owner);
        }
        if let Some(doc_type) = self.doc_type {
            query = query.doc_type(doc_type.into());
        }
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(ref sort) = self.sort {
            query = query.sort(sort);
        }

        query
    }
}

impl CatalogCommand {
    pub async fn execute(self, store: &CharmStore) -> Result<()> {
        match self {
            CatalogCommand::Search(args) => execute_search(store, &args).await,
            CatalogCommand::Show { id, json, raw } => execute_show(store, &id, json, raw).await,
            CatalogCommand::Revisions { id, json } => execute_revisions(store, &id, json).await,
            CatalogCommand::Related { id, json } => execute_related(store, &id, json).await,
            CatalogCommand::File { id, path } => execute_file(store, &id, &path).await,
            // Handled before a store is built
            CatalogCommand::Config => Ok(()),
        }
    }
}

/// Table row for search results
#[derive(Tabled)]
struct SearchResultRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Approved")]
    approved: String,
    #[tabled(rename = "Interfaces")]
    interfaces: String,
    #[tabled(rename = "Summary")]
    summary: String,
}

/// Table row for revision listings
#[derive(Tabled)]
struct RevisionRow {
    #[tabled(rename = "Id")]
    id: String,
    #[tabled(rename = "Revision")]
    revision: u64,
    #[tabled(rename = "Series")]
    series: String,
}

fn render_table<T: Tabled>(rows: &[T]) -> String {
    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string()
}

fn truncate(text: &str, max: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    if first_line.chars().count() > max {
        let cut: String = first_line.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    } else {
        first_line.to_string()
    }
}

fn display_id(entity: &Entity) -> String {
    entity.id.clone().unwrap_or_else(|| "-".to_string())
}

async fn execute_search(store: &CharmStore, args: &SearchArgs) -> Result<()> {
    // Bundle results carry no charm-metadata, so they map as plain entities
    if matches!(args.doc_type, Some(DocTypeArg::Bundle)) {
        let entities = store
            .search_entities(args.to_query())
            .await
            .context("Search failed")?;

        if args.json {
            println!("{}", serde_json::to_string_pretty(&entities)?);
        } else {
            print_results("bundle", entity_rows(&entities));
        }
        return Ok(());
    }

    let charms = store
        .search(args.to_query())
        .await
        .context("Search failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&charms)?);
    } else {
        print_results("charm", charm_rows(&charms));
    }
    Ok(())
}

fn print_results(kind: &str, rows: Vec<SearchResultRow>) {
    if rows.is_empty() {
        println!("No {kind}s found.");
        return;
    }

    println!("Found {} {kind}(s):\n", rows.len());
    println!("{}", render_table(&rows));
}

fn approved_label(entity: &Entity) -> String {
    let label = if entity.approved { "yes" } else { "" };
    label.to_string()
}

fn charm_rows(charms: &[Charm]) -> Vec<SearchResultRow> {
    charms
        .iter()
        .map(|charm| SearchResultRow {
            id: display_id(&charm.entity),
            approved: approved_label(&charm.entity),
            interfaces: charm.interfaces().into_iter().collect::<Vec<_>>().join(", "),
            summary: truncate(charm.summary.as_deref().unwrap_or(""), 50),
        })
        .collect()
}

fn entity_rows(entities: &[Entity]) -> Vec<SearchResultRow> {
    entities
        .iter()
        .map(|entity| SearchResultRow {
            id: display_id(entity),
            approved: approved_label(entity),
            interfaces: String::new(),
            summary: entity.name.clone().unwrap_or_default(),
        })
        .collect()
}

async fn execute_show(store: &CharmStore, id: &str, json: bool, raw: bool) -> Result<()> {
    let entity = store
        .entity(id)
        .await
        .with_context(|| format!("Failed to fetch '{id}'"))?;

    if raw {
        println!("{entity}");
        return Ok(());
    }

    // Bundles share the entity shape but carry no charm-metadata
    match Charm::from_data(entity.raw.clone()) {
        Ok(charm) if json => println!("{}", serde_json::to_string_pretty(&charm)?),
        Ok(charm) => print_charm(&charm)?,
        Err(_) if json => println!("{}", serde_json::to_string_pretty(&entity)?),
        Err(_) => print_entity(&entity),
    }

    Ok(())
}

fn print_entity(entity: &Entity) {
    println!();
    println!("Id:       {}", display_id(entity));
    if let Some(ref name) = entity.name {
        println!("Name:     {name}");
    }
    println!("Revision: {}", entity.revision);
    if let Some(ref series) = entity.series {
        println!("Series:   {series}");
    }
    if let Some(owner) = entity.owner.as_deref().filter(|o| !o.is_empty()) {
        println!("Owner:    {owner}");
    }
    if entity.approved {
        println!("Approved: yes");
    }
    if !entity.tags.is_empty() {
        println!("Tags:     {}", entity.tags.join(", "));
    }
    if let Some(ref source) = entity.source {
        println!("Source:   {source}");
    }

    if !entity.files.is_empty() {
        println!();
        println!("Files:");
        for file in &entity.files {
            println!("  {file}");
        }
    }
}

fn print_charm(charm: &Charm) -> Result<()> {
    print_entity(&charm.entity);

    if let Some(ref summary) = charm.summary {
        println!();
        println!("Summary: {summary}");
    }
    if charm.subordinate {
        println!("Subordinate: yes");
    }
    if !charm.terms.is_empty() {
        println!("Terms: {}", charm.terms.join(", "));
    }

    if let Some(ref description) = charm.description {
        println!();
        println!("Description:");
        for line in description.lines() {
            println!("  {line}");
        }
    }

    for kind in RelationKind::ALL {
        let relations = charm.relations(kind);
        if relations.is_empty() {
            continue;
        }

        println!();
        println!("{}:", kind.as_str());
        for name in relations.keys() {
            let relation = charm.relation(kind, name)?.unwrap_or_default();
            println!(
                "  {name}: {}",
                relation.interface.as_deref().unwrap_or("?")
            );
        }
    }

    if !charm.config.is_empty() {
        println!();
        println!("Config options:");
        for name in charm.config.keys() {
            let option = charm.config_option(name)?.unwrap_or_default();
            println!(
                "  {name} ({}): {}",
                option.option_type.as_deref().unwrap_or("?"),
                truncate(option.description.as_deref().unwrap_or(""), 60)
            );
        }
    }

    if !charm.actions.is_empty() {
        println!();
        println!("Actions:");
        for name in charm.actions.keys() {
            let action = charm.action(name)?.unwrap_or_default();
            println!(
                "  {name}: {}",
                truncate(action.description.as_deref().unwrap_or(""), 60)
            );
        }
    }

    Ok(())
}

async fn execute_revisions(store: &CharmStore, id: &str, json: bool) -> Result<()> {
    let entity = store
        .entity(id)
        .await
        .with_context(|| format!("Failed to fetch '{id}'"))?;

    let revisions = store
        .revisions(&entity)
        .await
        .with_context(|| format!("Failed to fetch revisions of '{id}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&revisions)?);
        return Ok(());
    }

    if revisions.is_empty() {
        println!("No revisions listed for {id}.");
        return Ok(());
    }

    let rows: Vec<RevisionRow> = revisions
        .iter()
        .map(|revision| RevisionRow {
            id: display_id(revision),
            revision: revision.revision,
            series: revision.series.clone().unwrap_or_default(),
        })
        .collect();

    println!("{}", render_table(&rows));
    Ok(())
}

async fn execute_related(store: &CharmStore, id: &str, json: bool) -> Result<()> {
    let charm = store
        .charm(id)
        .await
        .with_context(|| format!("Failed to fetch charm '{id}'"))?;

    let related = store
        .related(&charm)
        .await
        .with_context(|| format!("Failed to fetch charms related to '{id}'"))?;

    if json {
        let ids: serde_json::Value = related
            .iter()
            .map(|(kind, interfaces)| {
                let interfaces: serde_json::Map<String, serde_json::Value> = interfaces
                    .iter()
                    .map(|(interface, charms)| {
                        let ids: Vec<String> =
                            charms.iter().map(|c| display_id(c.entity())).collect();
                        (interface.clone(), serde_json::json!(ids))
                    })
                    .collect();
                (kind.clone(), serde_json::Value::Object(interfaces))
            })
            .collect::<serde_json::Map<_, _>>()
            .into();
        println!("{}", serde_json::to_string_pretty(&ids)?);
        return Ok(());
    }

    if related.is_empty() {
        println!("No related charms listed for {id}.");
        return Ok(());
    }

    for (kind, interfaces) in &related {
        println!("{kind}:");
        for (interface, charms) in interfaces {
            println!("  {interface}:");
            for charm in charms {
                println!(
                    "    {} - {}",
                    display_id(charm.entity()),
                    truncate(charm.summary.as_deref().unwrap_or(""), 50)
                );
            }
        }
    }

    Ok(())
}

async fn execute_file(store: &CharmStore, id: &str, path: &str) -> Result<()> {
    let entity = store
        .entity(id)
        .await
        .with_context(|| format!("Failed to fetch '{id}'"))?;

    let content = store.file(&entity, path).await?;
    print!("{content}");
    Ok(())
}
