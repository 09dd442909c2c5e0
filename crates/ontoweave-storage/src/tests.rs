//! End-to-end tests for template directories, config and output

use super::*;
use ontoweave_compiler::Compiler;
use ontoweave_ontology::{OntologyGraph, TemplateError, TemplateRepository};
use tempfile::tempdir;

const MOTOR: &str = r#"[
    {"parent": "pmd:Motor", "child": "motor_", "rel": "rdf:type", "is_rank": true},
    {"parent": "motor_", "child": "speed_", "rel": "pmd:characteristic"}
]"#;

fn write(dir: &Path, relative: &str, contents: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, contents).unwrap();
    path
}

// ============================================================================
// DirectoryTemplates
// ============================================================================

#[test]
fn test_templates_found_recursively() {
    let dir = tempdir().unwrap();
    write(dir.path(), "Motor.json", MOTOR);
    write(dir.path(), "electrical/Coil.json", "[]");
    write(dir.path(), "notes.txt", "not a template");

    let templates = DirectoryTemplates::open(dir.path()).unwrap();

    assert_eq!(templates.names().collect::<Vec<_>>(), vec!["Coil", "Motor"]);
    assert!(templates.contains("Coil"));
    assert!(!templates.contains("notes"));
    assert_eq!(templates.root(), dir.path());
    assert_eq!(
        templates.path_of("Coil"),
        Some(dir.path().join("electrical/Coil.json").as_path())
    );
    assert_eq!(templates.path_of("notes"), None);

    let rows = templates.relationships("Motor").unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows[0].is_rank);
    assert!(!rows[1].is_rank);

    let graph = OntologyGraph::load(&templates, "Motor").unwrap();
    assert!(graph.contains("speed_"));
}

#[test]
fn test_template_errors() {
    let dir = tempdir().unwrap();
    write(dir.path(), "Broken.json", "{ not json");
    let templates = DirectoryTemplates::open(dir.path()).unwrap();

    assert!(matches!(
        templates.relationships("Missing"),
        Err(TemplateError::NotFound { .. })
    ));
    assert!(matches!(
        templates.relationships("Broken"),
        Err(TemplateError::Malformed { ref name, .. }) if name == "Broken"
    ));

    std::fs::remove_file(dir.path().join("Broken.json")).unwrap();
    assert!(matches!(
        templates.relationships("Broken"),
        Err(TemplateError::Io { .. })
    ));
}

#[test]
fn test_missing_template_directory() {
    let dir = tempdir().unwrap();
    let err = DirectoryTemplates::open(dir.path().join("nope")).unwrap_err();
    assert!(err.to_string().contains("template directory not found"));
}

// ============================================================================
// ProjectConfig
// ============================================================================

#[test]
fn test_config_defaults_when_absent() {
    let dir = tempdir().unwrap();
    let config = ProjectConfig::load_or_default(&dir.path().join(PROJECT_FILE)).unwrap();
    assert_eq!(config, ProjectConfig::default());
    assert_eq!(config.compiler.link_template, "db_identifier");
}

#[test]
fn test_config_paths_relative_to_file() {
    let dir = tempdir().unwrap();
    let path = write(
        dir.path(),
        PROJECT_FILE,
        r#"{"template_dir": "tpl", "compiler": {"adopt_template": "pump_ref"}}"#,
    );

    let config = ProjectConfig::load(&path).unwrap();

    assert_eq!(config.template_dir, dir.path().join("tpl"));
    assert_eq!(config.output_dir, dir.path().join("./ontologies"));
    assert_eq!(config.compiler.adopt_template, "pump_ref");
    assert_eq!(config.compiler.link_template, "db_identifier");
}

#[test]
fn test_invalid_config_reports_path() {
    let dir = tempdir().unwrap();
    let path = write(dir.path(), PROJECT_FILE, "[1, 2]");
    let err = ProjectConfig::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains(PROJECT_FILE));
}

// ============================================================================
// OutputWriter
// ============================================================================

#[test]
fn test_compile_and_write() {
    let dir = tempdir().unwrap();
    write(dir.path(), "templates/Motor.json", MOTOR);
    let diagram_path = write(
        dir.path(),
        "diagram.json",
        r#"{
            "relationships": [
                {"parent_id": "a", "parent": "~M[Motor|motor_]", "child_id": "b",
                 "child": "3.5(speed_)", "rel": "mds:define", "rel_id": "r1"}
            ]
        }"#,
    );
    let config = ProjectConfig {
        template_dir: dir.path().join("templates"),
        output_dir: dir.path().join("out"),
        ..ProjectConfig::default()
    };

    let diagram = read_diagram(&diagram_path).unwrap();
    let templates = config.templates().unwrap();
    let compiled = Compiler::with_config(&templates, config.compiler.clone()).compile(&diagram);
    let written = config.writer().write(&compiled).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0], dir.path().join("out/M.json"));
    assert_eq!(written[1], dir.path().join("out").join(REPORT_FILE));

    let rows: Vec<ontoweave_ontology::RelationshipRow> =
        serde_json::from_str(&std::fs::read_to_string(&written[0]).unwrap()).unwrap();
    assert!(rows
        .iter()
        .any(|r| r.parent == "~M" && r.child == "3.5" && r.rel == "pmd:characteristic"));

    let report: ontoweave_compiler::CompileReport =
        serde_json::from_str(&std::fs::read_to_string(&written[1]).unwrap()).unwrap();
    assert_eq!(report, compiled.report);
}

#[test]
fn test_output_names_stay_in_directory() {
    let dir = tempdir().unwrap();
    let writer = OutputWriter::new(dir.path());
    let ontology = ontoweave_compiler::CompiledOntology {
        root_id: "x".to_string(),
        name: "../escape".to_string(),
        relationships: Vec::new(),
    };
    assert_eq!(writer.path_for(&ontology), dir.path().join(".._escape.json"));
}
