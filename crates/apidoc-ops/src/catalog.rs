use std::fs;
use std::path::PathBuf;

use apidoc_format::{title_case, ListFormat};
use apidoc_schema::{IndexFile, ItemKind, SchemaIndex};
use apidoc_utils::atomic_write;
use serde::Serialize;
use serde_json::json;
use strsim::normalized_levenshtein;
use tracing::{info, warn};

use crate::{OperationError, OperationResult, Operations};

const SUGGESTION_THRESHOLD: f64 = 0.6;

#[derive(Clone, Debug)]
pub struct ShowOptions {
    pub name: String,
}

#[derive(Clone, Debug)]
pub struct ShowOutcome {
    pub target: String,
    pub rendered: String,
}

#[derive(Clone, Debug)]
pub struct ListOptions {
    pub format: ListFormat,
    /// Only items in this category; `Other` selects uncategorised items.
    pub category: Option<String>,
    pub include_hidden: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct ItemSummary {
    pub name: String,
    pub title: String,
    pub kind: ItemKind,
    pub category: String,
    pub package: String,
    pub target: String,
    pub link: String,
    pub hidden: bool,
}

#[derive(Clone, Debug)]
pub struct ListOutcome {
    pub items: Vec<ItemSummary>,
    pub rendered: String,
}

#[derive(Clone, Debug)]
pub struct IndexRunOptions {
    pub write: bool,
}

#[derive(Clone, Debug)]
pub struct IndexOutcome {
    pub path: PathBuf,
    pub listing: IndexFile,
    pub rendered: String,
    pub written: bool,
}

impl Operations {
    pub fn show(&self, options: ShowOptions) -> OperationResult<ShowOutcome> {
        let index = self.load_index()?;
        let Some(entry) = index.lookup(&options.name) else {
            return Err(OperationError::ItemNotFound {
                suggestion: closest_name(&index, &options.name),
                name: options.name,
            });
        };

        Ok(ShowOutcome {
            target: entry.target().to_string(),
            rendered: self.renderer(&index).render(entry.info()),
        })
    }

    pub fn list(&self, options: ListOptions) -> OperationResult<ListOutcome> {
        let index = self.load_index()?;
        let items: Vec<ItemSummary> = index
            .entries()
            .filter(|entry| options.include_hidden || !entry.info().hidden)
            .filter(|entry| match options.category.as_deref() {
                None => true,
                Some("Other") => entry.info().category.is_empty(),
                Some(category) => entry.info().category == category,
            })
            .map(|entry| {
                let info = entry.info();
                ItemSummary {
                    name: info.name.clone(),
                    title: title_case(&info.name),
                    kind: info.item.kind(),
                    category: info.category.clone(),
                    package: info.package.clone(),
                    target: entry.target().to_string(),
                    link: self.link_to(entry.target()),
                    hidden: info.hidden,
                }
            })
            .collect();

        let rendered = match options.format {
            ListFormat::Plain => render_plain_list(&items),
            ListFormat::Json => render_json(&json!({ "items": items }))?,
        };
        Ok(ListOutcome { items, rendered })
    }

    /// Rebuild the index file from the items on disk, keeping the version of
    /// the existing index.
    pub fn build_index(&self, options: IndexRunOptions) -> OperationResult<IndexOutcome> {
        let input = &self.config().input;
        let discovered = SchemaIndex::discover(&input.dir, &input.index_relative())?;

        let mut listing = discovered.to_index_file();
        listing.version = existing_version(&input.index);

        let mut rendered = render_json(&listing)?;
        rendered.push('\n');

        if options.write {
            atomic_write(&input.index, &rendered)
                .map_err(|err| OperationError::io(&input.index, err))?;
            info!(
                path = %input.index.display(),
                items = listing.items.len(),
                "wrote schema index"
            );
        }

        Ok(IndexOutcome {
            path: input.index.clone(),
            listing,
            rendered,
            written: options.write,
        })
    }
}

fn closest_name(index: &SchemaIndex, name: &str) -> Option<String> {
    index
        .names()
        .map(|candidate| (normalized_levenshtein(name, candidate), candidate))
        .filter(|(score, _)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

fn existing_version(path: &std::path::Path) -> Option<String> {
    let contents = fs::read_to_string(path).ok()?;
    match serde_json::from_str::<IndexFile>(&contents) {
        Ok(listing) => listing.version,
        Err(err) => {
            warn!(path = %path.display(), %err, "ignoring unreadable index file");
            None
        }
    }
}

fn render_plain_list(items: &[ItemSummary]) -> String {
    if items.is_empty() {
        return "No items found.".to_string();
    }
    items
        .iter()
        .map(|item| {
            let marker = if item.hidden { " (hidden)" } else { "" };
            format!("{}\t{}\t{}{marker}", item.kind.as_str(), item.name, item.link)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub(crate) fn render_json<T: Serialize>(value: &T) -> OperationResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| OperationError::InvalidInput(format!("failed to encode JSON: {err}")))
}
