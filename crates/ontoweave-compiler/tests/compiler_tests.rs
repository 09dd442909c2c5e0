//! Diagram compilation E2E tests

use ontoweave_compiler::*;
use ontoweave_ontology::{InMemoryTemplates, RelationshipRow};

fn row(parent: &str, child: &str, rel: &str, is_rank: bool) -> RelationshipRow {
    RelationshipRow::new(parent, child, rel, is_rank)
}

fn templates() -> InMemoryTemplates {
    InMemoryTemplates::new()
        .with_template(
            "Motor",
            vec![
                row("pmd:Motor", "motor_", "rdf:type", true),
                row("motor_", "speed_", "pmd:characteristic", false),
                row("motor_", "coil_", "pmd:hasPart", false),
            ],
        )
        .with_template(
            "Coil",
            vec![
                row("pmd:Coil", "coil_", "rdf:type", true),
                row("motor_", "coil_", "pmd:hasPart", false),
                row("coil_", "wire_", "pmd:hasPart", false),
                row("length_", "wire_", "pmd:measures", false),
            ],
        )
        .with_template(
            "Plant",
            vec![row("pmd:Plant", "plant_", "rdf:type", true)],
        )
        .with_template(
            "Drive",
            vec![
                row("pmd:Drive", "drive_", "rdf:type", true),
                row("plant_", "drive_", "pmd:hasPart", false),
                row("drive_", "voltage_", "pmd:characteristic", false),
            ],
        )
        .with_template(
            "db_identifier",
            vec![row("pmd:Identifier", "db_identifier_", "rdf:type", true)],
        )
        .with_template(
            "motor_ref",
            vec![
                row("pmd:Device", "pmd:Machine", "rdfs:subClassOf", true),
                row("pmd:Machine", "model_motor", "rdf:type", true),
                row("model_motor", "rotor_", "pmd:hasPart", false),
                row("model_motor", "*stator_", "pmd:hasPart", false),
                row("pmd:Rotor", "rotor_", "rdf:type", true),
            ],
        )
}

fn has(ontology: &CompiledOntology, parent: &str, child: &str, rel: &str) -> bool {
    ontology
        .relationships
        .iter()
        .any(|r| r.parent == parent && r.child == child && r.rel == rel)
}

fn mentions(ontology: &CompiledOntology, label: &str) -> bool {
    ontology
        .relationships
        .iter()
        .any(|r| r.parent == label || r.child == label)
}

const MOTOR: (&str, &str) = ("m", "M[Motor|motor_]");

// ============================================================================
// Single component
// ============================================================================

#[test]
fn test_compile_all_operation_kinds() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(MOTOR, "mds:bind", ("c", "<b>C[Coil|coil_]</b>"))
        .relate(MOTOR, "mds:define", ("v", "<div>3.5(speed_)</div>"))
        .relate(MOTOR, "mds:link", ("i", "sensor-42"))
        .relate(MOTOR, "mds:adopt", ("x", "model_motor"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert!(compiled.report.is_clean(), "{:?}", compiled.report);
    assert_eq!(compiled.ontologies.len(), 1);
    let motor = compiled.ontology("M").unwrap();
    assert_eq!(motor.root_id, "m");

    // link ran before define, so the identifier hangs off the defined value
    assert!(has(motor, "3.5", "sensor-42", "pmd:resource"));
    assert!(has(motor, "M", "3.5", "pmd:characteristic"));
    assert!(!mentions(motor, "M speed"));

    assert!(has(motor, "pmd:Machine", "M", "rdf:type"));
    assert!(has(motor, "M", "M rotor", "pmd:hasPart"));
    assert!(!mentions(motor, "*stator_"));

    assert!(has(motor, "M", "C", "pmd:hasPart"));
    assert!(has(motor, "C", "C wire", "pmd:hasPart"));
    assert!(has(motor, "M length", "C wire", "pmd:measures"));
    assert!(!mentions(motor, "motor_"));
}

#[test]
fn test_bind_without_path_is_skipped() {
    let repo = templates();
    let diagram = DiagramInput::new().relate(MOTOR, "mds:bind", ("b", "B[Motor|motor_]"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    let motor = compiled.ontology("M").unwrap();
    assert!(!mentions(motor, "B"));
    let skipped: Vec<_> = compiled.report.skipped().collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].parent_id, "m");
    assert_eq!(skipped[0].child_id, "b");
    assert!(compiled.report.failures().next().is_none());
    assert!(!compiled.report.is_clean());
}

#[test]
fn test_container_binds_innermost_root() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(("d", "D[Drive|drive_]"), "mds:define", ("v", "400V(voltage_)"))
        .designate("hall", "~Hall[Plant|plant_]", &[])
        .inside("d", &["hall"]);

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert_eq!(compiled.ontologies.len(), 1, "{:?}", compiled.report);
    let hall = &compiled.ontologies[0];
    assert_eq!(hall.name, "Hall");
    assert_eq!(hall.root_id, "hall");
    assert!(has(hall, "~Hall", "D", "pmd:hasPart"));
    assert!(has(hall, "D", "400V", "pmd:characteristic"));
    assert!(has(hall, "pmd:Plant", "~Hall", "rdf:type"));
    assert!(!mentions(hall, "plant_"));
}

// ============================================================================
// Multiple components
// ============================================================================

#[test]
fn test_place_connects_components() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(MOTOR, "mds:bind", ("c", "C[Coil|coil_]"))
        .relate(("n", "N[Motor|motor_]"), "mds:define", ("v", "5(speed_)"))
        .relate(MOTOR, "mds:place", ("n", "N[Motor|motor_]"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert_eq!(compiled.ontologies.len(), 2);
    let motor = compiled.ontology("M").unwrap();
    assert!(has(motor, "M", "N", "mds:place"));
    assert!(has(motor, "N", "N speed", "pmd:characteristic"));

    let other = compiled.ontology("N").unwrap();
    assert!(has(other, "N", "5", "pmd:characteristic"));
    assert!(!mentions(other, "M"));
}

#[test]
fn test_place_from_isolate() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(MOTOR, "mds:bind", ("c", "C[Coil|coil_]"))
        .relate(("s", "S[Motor|motor_]"), "mds:place", ("c", "C[Coil|coil_]"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert_eq!(compiled.report.isolates, vec!["s".to_string()]);
    assert_eq!(compiled.ontologies.len(), 1);
    let root = &compiled.ontologies[0];
    assert!(has(root, "S", "C", "mds:place"));
    assert!(has(root, "pmd:Motor", "S", "rdf:type"));
    assert!(root
        .relationships
        .iter()
        .any(|r| r.parent == "S" && r.rel == "pmd:characteristic"));
}

#[test]
fn test_failed_isolate_reports_cause_in_every_component() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(MOTOR, "mds:bind", ("c", "C[Coil|coil_]"))
        .relate(("n", "N[Motor|motor_]"), "mds:bind", ("k", "K[Coil|coil_]"))
        .relate(("s", "S[Pump|pump_]"), "mds:place", ("c", "C[Coil|coil_]"))
        .relate(("s", "S[Pump|pump_]"), "mds:place", ("k", "K[Coil|coil_]"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert!(compiled.ontologies.is_empty());
    let failures: Vec<_> = compiled.report.failures().collect();
    assert_eq!(failures.len(), 2);
    for failure in failures {
        let error = failure.error.as_deref().unwrap();
        assert!(error.contains("`s`"), "{error}");
        assert!(error.contains("Pump"), "{error}");
    }
}

#[test]
fn test_failed_component_does_not_abort_others() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(MOTOR, "mds:define", ("bad", "3.5 speed_"))
        .relate(("n", "N[Motor|motor_]"), "mds:define", ("v", "5(speed_)"))
        .relate(("p", "P[Pump|pump_]"), "mds:define", ("w", "1(flow_)"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert_eq!(compiled.ontologies.len(), 1);
    assert_eq!(compiled.ontologies[0].name, "N");

    let failures: Vec<_> = compiled.report.failures().collect();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0].root_id.as_deref(), Some("m"));
    assert!(failures[0].error.as_deref().unwrap().contains("malformed"));
    assert_eq!(failures[1].root_id.as_deref(), Some("p"));
    assert!(failures[1].error.as_deref().unwrap().contains("Pump"));
}

#[test]
fn test_bind_to_plain_label_fails_component() {
    let repo = templates();
    let diagram = DiagramInput::new().relate(MOTOR, "mds:bind", ("t", "just a note"));

    let compiled = Compiler::new(&repo).compile(&diagram);

    assert!(compiled.ontologies.is_empty());
    let failure = compiled.report.failures().next().unwrap();
    assert!(failure.error.as_deref().unwrap().contains("`t`"));
}

#[test]
fn test_custom_reference_templates() {
    let repo = templates().with_template(
        "serial",
        vec![row("pmd:Serial", "db_identifier_", "rdf:type", true)],
    );
    let config = CompilerConfig {
        link_template: "serial".to_string(),
        ..CompilerConfig::default()
    };
    let diagram = DiagramInput::new().relate(MOTOR, "mds:link", ("i", "SN-1(speed_)"));

    let compiled = Compiler::with_config(&repo, config).compile(&diagram);

    let motor = compiled.ontology("M").unwrap();
    assert!(has(motor, "M speed", "SN-1", "pmd:resource"));
    assert!(has(motor, "pmd:Serial", "SN-1", "rdf:type"));
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_plan_matches_compile_components() {
    let repo = templates();
    let diagram = DiagramInput::new()
        .relate(MOTOR, "mds:bind", ("c", "C[Coil|coil_]"))
        .relate(MOTOR, "mds:adopt", ("x", "model_motor"))
        .relate(("n", "N[Motor|motor_]"), "pmd:note", ("t", "checked"))
        .designate("lonely", "orphan", &[]);
    let compiler = Compiler::new(&repo);

    let plan = compiler.plan(&diagram);
    assert_eq!(plan.components.len(), 2);
    assert_eq!(plan.isolates, vec!["lonely".to_string()]);
    let first: Vec<OperationKind> = plan.components[0]
        .operations
        .iter()
        .map(|op| op.kind)
        .collect();
    assert_eq!(first, vec![OperationKind::Adopt, OperationKind::Bind]);

    let compiled = compiler.compile(&diagram);
    assert_eq!(compiled.report.components.len(), plan.components.len());
    assert_eq!(compiled.ontologies.len(), 2);
}

#[test]
fn test_report_serializes() {
    let repo = templates();
    let diagram = DiagramInput::new().relate(MOTOR, "mds:bind", ("b", "B[Motor|motor_]"));
    let compiled = Compiler::new(&repo).compile(&diagram);

    let json = serde_json::to_string(&compiled.report).unwrap();
    let back: CompileReport = serde_json::from_str(&json).unwrap();
    assert_eq!(back, compiled.report);
}
