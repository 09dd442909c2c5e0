//! Templates stored as JSON relationship tables on disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use ontoweave_ontology::{RelationshipRow, TemplateError, TemplateRepository};
use walkdir::WalkDir;

pub const TEMPLATE_EXTENSION: &str = "json";

/// Every `<name>.json` below a directory, addressable by `name`.
///
/// A template file holds an array of `{parent, child, rel, is_rank}` rows.
/// Files are indexed when the directory is opened and read on each lookup.
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    root: PathBuf,
    paths: BTreeMap<String, PathBuf>,
}

impl DirectoryTemplates {
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(anyhow!("template directory not found: {}", root.display()));
        }

        let mut paths: BTreeMap<String, PathBuf> = BTreeMap::new();
        for entry in WalkDir::new(&root).follow_links(true).sort_by_file_name() {
            let entry = entry
                .with_context(|| format!("failed to walk template directory {}", root.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !path.extension().map_or(false, |e| e == TEMPLATE_EXTENSION) {
                continue;
            }
            let Some(name) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            if let Some(existing) = paths.get(&name) {
                tracing::warn!(
                    template = %name,
                    kept = %existing.display(),
                    ignored = %path.display(),
                    "duplicate template name"
                );
                continue;
            }
            paths.insert(name, path.to_path_buf());
        }

        tracing::debug!(root = %root.display(), templates = paths.len(), "indexed template directory");
        Ok(Self { root, paths })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.paths.keys().map(String::as_str)
    }

    pub fn path_of(&self, name: &str) -> Option<&Path> {
        self.paths.get(name).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl TemplateRepository for DirectoryTemplates {
    fn relationships(&self, name: &str) -> Result<Vec<RelationshipRow>, TemplateError> {
        let path = self.paths.get(name).ok_or_else(|| TemplateError::NotFound {
            name: name.to_string(),
        })?;
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            name: name.to_string(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|err| TemplateError::Malformed {
            name: name.to_string(),
            message: err.to_string(),
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.paths.contains_key(name)
    }
}
