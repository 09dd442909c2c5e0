use std::path::{Path, PathBuf};

use anyhow::Context;
use ontoweave_compiler::{CompiledDiagram, CompiledOntology};

pub const REPORT_FILE: &str = "report.json";

/// Writes compiled ontologies, one pretty JSON file per root, plus the
/// compile report.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, ontology: &CompiledOntology) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(&ontology.name)))
    }

    /// Returns the written paths, report last.
    pub fn write(&self, diagram: &CompiledDiagram) -> anyhow::Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("failed to create output directory {}", self.dir.display()))?;

        let mut written = Vec::with_capacity(diagram.ontologies.len() + 1);
        for ontology in &diagram.ontologies {
            let path = self.path_for(ontology);
            let json = serde_json::to_string_pretty(&ontology.relationships)?;
            std::fs::write(&path, json)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!(ontology = %ontology.name, path = %path.display(), "wrote ontology");
            written.push(path);
        }

        let report_path = self.dir.join(REPORT_FILE);
        let json = serde_json::to_string_pretty(&diagram.report)?;
        std::fs::write(&report_path, json)
            .with_context(|| format!("failed to write {}", report_path.display()))?;
        written.push(report_path);
        Ok(written)
    }
}

/// Root names become file names; path separators would escape the output
/// directory.
fn file_stem(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}
