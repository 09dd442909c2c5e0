use ontoweave_ontology::{OntologyEntity, OntologyGraph, RelationshipRow, TermRegistry};
use proptest::prelude::*;

fn term() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[a-e]{1,2}_?").unwrap()
}

fn motor() -> OntologyGraph {
    OntologyGraph::from_relationships(vec![
        RelationshipRow::new("pmd:Motor", "motor_", "rdf:type", true),
        RelationshipRow::new("motor_", "speed_", "pmd:characteristic", false),
        RelationshipRow::new("motor_", "coil_", "pmd:hasPart", false),
    ])
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn registry_stays_bijective(ops in proptest::collection::vec((term(), term()), 0..40)) {
        let mut registry = TermRegistry::new();
        for (key, value) in &ops {
            registry.set(key.clone(), value.clone());
        }
        for (key, value) in registry.iter() {
            prop_assert_eq!(registry.key_of(value).unwrap(), key);
        }
    }

    #[test]
    fn renames_keep_registry_bijective(renames in proptest::collection::vec((term(), term()), 0..30)) {
        let mut registry = TermRegistry::identity(["a_", "b_", "c_"]);
        for (old, new) in &renames {
            registry.record_rename(old, new);
        }
        for (key, value) in registry.iter() {
            prop_assert_eq!(registry.key_of(value).unwrap(), key);
        }
    }

    #[test]
    fn replace_node_with_itself_changes_nothing(label in prop_oneof![
        Just("M".to_string()),
        Just("M speed".to_string()),
        Just("pmd:Motor".to_string()),
        term(),
    ]) {
        let mut entity = OntologyEntity::from_graph("M", "Motor", "motor_", motor()).unwrap();
        let registry = entity.registry().clone();
        let rows = entity.relationships();
        entity.replace_node(&label, &label, false).unwrap();
        prop_assert_eq!(entity.registry(), &registry);
        prop_assert_eq!(entity.relationships(), rows);
    }
}
