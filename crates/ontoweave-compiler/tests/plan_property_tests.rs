//! Property-based tests for operation scheduling

use ontoweave_compiler::*;
use ontoweave_ontology::InMemoryTemplates;
use proptest::prelude::*;

fn rel() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("mds:bind"),
        Just("mds:define"),
        Just("mds:link"),
        Just("mds:adopt"),
        Just("pmd:note"),
    ]
}

/// A chain `n0 -> n1 -> ...` with a fan of operations off each chain node.
fn diagram(chain: &[&'static str], fans: &[Vec<&'static str>]) -> DiagramInput {
    let mut input = DiagramInput::new();
    let label = |i: usize| format!("N{i}[T|t_]");
    for (i, rel) in chain.iter().enumerate() {
        let (parent, child) = (format!("n{i}"), format!("n{}", i + 1));
        input = input.relate(
            (parent.as_str(), label(i).as_str()),
            rel,
            (child.as_str(), label(i + 1).as_str()),
        );
    }
    for (i, fan) in fans.iter().enumerate() {
        let parent = i % (chain.len() + 1);
        let parent_id = format!("n{parent}");
        for (j, rel) in fan.iter().enumerate() {
            let leaf = format!("leaf{i}-{j}");
            input = input.relate(
                (parent_id.as_str(), label(parent).as_str()),
                rel,
                (leaf.as_str(), "1(t_)"),
            );
        }
    }
    input
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_connected_diagram_is_one_component(
        chain in prop::collection::vec(rel(), 1..6),
        fans in prop::collection::vec(prop::collection::vec(rel(), 0..4), 0..4),
    ) {
        let input = diagram(&chain, &fans);
        let templates = InMemoryTemplates::new();
        let plan = Compiler::new(&templates).plan(&input);

        prop_assert_eq!(plan.components.len(), 1);
        let component = &plan.components[0];
        prop_assert_eq!(component.root_id.as_deref(), Some("n0"));
        prop_assert_eq!(component.operations.len(), input.relationships.len());
        prop_assert!(component.unreached.is_empty());
    }

    #[test]
    fn prop_weights_never_increase(
        chain in prop::collection::vec(rel(), 1..6),
        fans in prop::collection::vec(prop::collection::vec(rel(), 0..4), 0..4),
    ) {
        let input = diagram(&chain, &fans);
        let templates = InMemoryTemplates::new();
        let plan = Compiler::new(&templates).plan(&input);

        let weights: Vec<u8> = plan.components[0]
            .operations
            .iter()
            .map(PlannedOperation::weight)
            .collect();
        prop_assert!(weights.windows(2).all(|w| w[0] >= w[1]), "{:?}", weights);
    }

    #[test]
    fn prop_chain_binds_run_deepest_first(len in 1usize..8) {
        let chain = vec!["mds:bind"; len];
        let input = diagram(&chain, &[]);
        let templates = InMemoryTemplates::new();
        let plan = Compiler::new(&templates).plan(&input);

        let parents: Vec<String> = plan.components[0]
            .operations
            .iter()
            .map(|op| op.parent_id.clone())
            .collect();
        let expected: Vec<String> = (0..len).rev().map(|i| format!("n{i}")).collect();
        prop_assert_eq!(parents, expected);
    }
}
