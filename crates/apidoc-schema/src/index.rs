use std::collections::HashMap;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{SchemaError, SchemaResult};
use crate::model::ItemInfo;

/// On-disk listing of every item file, relative to the input directory.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub items: Vec<String>,
}

/// A loaded item together with the index path it came from.
#[derive(Clone, Debug)]
pub struct IndexEntry {
    path: String,
    info: ItemInfo,
}

impl IndexEntry {
    /// Entry path relative to the input directory, e.g. `todel/Message.json`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Entry path without the `.json` extension, e.g. `todel/Message`.
    pub fn target(&self) -> &str {
        self.path.strip_suffix(".json").unwrap_or(&self.path)
    }

    /// The type name this entry answers to: its file stem.
    pub fn type_name(&self) -> &str {
        let target = self.target();
        target.rsplit('/').next().unwrap_or(target)
    }

    pub fn info(&self) -> &ItemInfo {
        &self.info
    }
}

/// Immutable name → definition lookup built from an autodoc directory.
#[derive(Clone, Debug, Default)]
pub struct SchemaIndex {
    version: Option<String>,
    entries: Vec<IndexEntry>,
    by_name: HashMap<String, usize>,
}

impl SchemaIndex {
    /// Load every item listed in `index_file`. A relative `index_file` is
    /// resolved against `dir`.
    pub fn load(dir: &Path, index_file: &Path) -> SchemaResult<Self> {
        let index_path = resolve(dir, index_file);
        let contents = fs::read_to_string(&index_path).map_err(|source| SchemaError::Io {
            path: index_path.clone(),
            source,
        })?;
        let listing: IndexFile =
            serde_json::from_str(&contents).map_err(|source| SchemaError::Parse {
                path: index_path.clone(),
                source,
            })?;

        debug!(
            index = %index_path.display(),
            items = listing.items.len(),
            "loading schema index"
        );

        let mut entries = Vec::with_capacity(listing.items.len());
        for entry in listing.items {
            let entry = normalize_entry(&entry)?;
            let info = read_item(&dir.join(&entry))?;
            entries.push((entry, info));
        }

        let mut index = Self::from_entries(entries)?;
        index.version = listing.version;
        Ok(index)
    }

    /// Walk `dir` for item files, skipping the index file itself. Entries are
    /// ordered by path so the result is stable across platforms.
    pub fn discover(dir: &Path, index_file: &Path) -> SchemaResult<Self> {
        let index_path = resolve(dir, index_file);
        let mut entries = Vec::new();

        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = entry.map_err(|source| SchemaError::Walk {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some("json")
                || path == index_path
            {
                continue;
            }

            let relative = path.strip_prefix(dir).unwrap_or(path);
            let relative = relative
                .components()
                .filter_map(|component| match component {
                    Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("/");
            entries.push((relative, read_item(path)?));
        }

        debug!(dir = %dir.display(), items = entries.len(), "discovered schema items");
        Self::from_entries(entries)
    }

    /// Use the index file when it exists, otherwise discover items on disk.
    pub fn load_or_discover(dir: &Path, index_file: &Path) -> SchemaResult<Self> {
        if resolve(dir, index_file).is_file() {
            Self::load(dir, index_file)
        } else {
            Self::discover(dir, index_file)
        }
    }

    /// Build an index from in-memory `(entry path, item)` pairs.
    pub fn from_entries<I, S>(items: I) -> SchemaResult<Self>
    where
        I: IntoIterator<Item = (S, ItemInfo)>,
        S: AsRef<str>,
    {
        let mut index = SchemaIndex::default();
        for (path, mut info) in items {
            let path = normalize_entry(path.as_ref())?;
            if info.package.is_empty() {
                if let Some((package, _)) = path.rsplit_once('/') {
                    info.package = package.to_string();
                }
            }

            let entry = IndexEntry { path, info };
            let name = entry.type_name().to_string();
            if let Some(existing) = index.by_name.get(&name) {
                warn!(
                    name = %name,
                    kept = %index.entries[*existing].path,
                    ignored = %entry.path,
                    "duplicate type name in schema index"
                );
            } else {
                index.by_name.insert(name, index.entries.len());
            }
            index.entries.push(entry);
        }
        Ok(index)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in index order, duplicates included.
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    /// Resolve a type name to its definition. The first entry wins when two
    /// packages share a name.
    pub fn lookup(&self, type_name: &str) -> Option<&IndexEntry> {
        self.by_name
            .get(type_name)
            .and_then(|idx| self.entries.get(*idx))
    }

    /// Cross-link target for a type name, e.g. `todel/Message`.
    pub fn link_target(&self, type_name: &str) -> Option<&str> {
        self.lookup(type_name).map(IndexEntry::target)
    }

    /// True when some entry has exactly this link target.
    pub fn has_target(&self, target: &str) -> bool {
        self.entries.iter().any(|entry| entry.target() == target)
    }

    /// Distinct type names, in index order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(idx, entry)| self.by_name.get(entry.type_name()) == Some(idx))
            .map(|(_, entry)| entry.type_name())
    }

    pub fn to_index_file(&self) -> IndexFile {
        IndexFile {
            version: self.version.clone(),
            items: self.entries.iter().map(|e| e.path.clone()).collect(),
        }
    }
}

fn resolve(dir: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() {
        file.to_path_buf()
    } else {
        dir.join(file)
    }
}

fn read_item(path: &Path) -> SchemaResult<ItemInfo> {
    let contents = fs::read_to_string(path).map_err(|source| SchemaError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| SchemaError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn normalize_entry(entry: &str) -> SchemaResult<String> {
    let normalized = entry.trim().replace('\\', "/");
    let normalized = normalized.trim_start_matches("./").to_string();
    let valid = normalized.ends_with(".json")
        && !normalized.starts_with('/')
        && normalized
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "..");
    if valid {
        Ok(normalized)
    } else {
        Err(SchemaError::InvalidEntry {
            entry: entry.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_entry_separators() {
        assert_eq!(
            normalize_entry("./todel\\Message.json").unwrap(),
            "todel/Message.json"
        );
    }

    #[test]
    fn rejects_escaping_entries() {
        assert!(normalize_entry("../Message.json").is_err());
        assert!(normalize_entry("/abs/Message.json").is_err());
        assert!(normalize_entry("todel/Message.toml").is_err());
        assert!(normalize_entry("todel//Message.json").is_err());
    }
}
