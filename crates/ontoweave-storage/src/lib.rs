//! Ontoweave storage
//!
//! Everything that touches the filesystem:
//!
//! ```text
//!   ontoweave.json ──► ProjectConfig ──┬─► DirectoryTemplates (template_dir/**/<name>.json)
//!                                      ├─► CompilerConfig
//!                                      └─► OutputWriter (output_dir/<root>.json, report.json)
//! ```

pub mod output;
pub mod templates;

#[cfg(test)]
mod tests;

use std::path::{Path, PathBuf};

use anyhow::Context;
use ontoweave_compiler::{CompilerConfig, DiagramInput};
use serde::{Deserialize, Serialize};

pub use output::{OutputWriter, REPORT_FILE};
pub use templates::DirectoryTemplates;

pub const PROJECT_FILE: &str = "ontoweave.json";

/// Project configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory searched for `<template>.json` files
    pub template_dir: PathBuf,
    /// Directory compiled ontologies are written to
    pub output_dir: PathBuf,
    pub compiler: CompilerConfig,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./templates"),
            output_dir: PathBuf::from("./ontologies"),
            compiler: CompilerConfig::default(),
        }
    }
}

impl ProjectConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let mut config: Self = serde_json::from_str(&text)
            .with_context(|| format!("invalid config {}", path.display()))?;
        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Load `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!(path = %path.display(), "no project config, using defaults");
            Ok(Self::default())
        }
    }

    /// Relative directories are taken relative to the config file.
    fn resolve_relative_to(&mut self, base: &Path) {
        for dir in [&mut self.template_dir, &mut self.output_dir] {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }

    pub fn templates(&self) -> anyhow::Result<DirectoryTemplates> {
        DirectoryTemplates::open(&self.template_dir)
    }

    pub fn writer(&self) -> OutputWriter {
        OutputWriter::new(&self.output_dir)
    }
}

pub fn read_diagram(path: &Path) -> anyhow::Result<DiagramInput> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read diagram {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid diagram {}", path.display()))
}
