use std::path::PathBuf;

use colored::Colorize;
use ontoweave_compiler::{CompiledDiagram, ExecutionPlan};
use ontoweave_ontology::OntologyGraph;

pub fn print_report(compiled: &CompiledDiagram, written: &[PathBuf]) {
    for component in &compiled.report.components {
        let root = component.root_id.as_deref().unwrap_or("?");
        match &component.error {
            None => eprintln!(
                "{} component {} ({} operations)",
                "ok".green().bold(),
                root.bold(),
                component.operations
            ),
            Some(error) => eprintln!("{} component {}: {}", "error".red().bold(), root.bold(), error),
        }
        for skipped in &component.skipped {
            eprintln!(
                "  {} bind {} → {}: {}",
                "skipped".yellow().bold(),
                skipped.parent_id,
                skipped.child_id,
                skipped.reason
            );
        }
        if !component.unreached.is_empty() {
            eprintln!(
                "  {} {} edges unreachable from the root",
                "info:".yellow().bold(),
                component.unreached.len()
            );
        }
    }
    if !compiled.report.unplaced.is_empty() {
        eprintln!(
            "{} unplaced relationships: {}",
            "info:".yellow().bold(),
            compiled.report.unplaced.join(", ")
        );
    }
    for path in written {
        eprintln!("{} {}", "wrote".green().bold(), path.display().to_string().bold());
    }
}

pub fn print_plan(plan: &ExecutionPlan) {
    for (i, component) in plan.components.iter().enumerate() {
        let root = component.root_id.as_deref().unwrap_or("<no root>");
        println!(
            "{} {} root {} ({} nodes)",
            "component".green().bold(),
            i,
            root.bold(),
            component.nodes.len()
        );
        for (step, op) in component.operations.iter().enumerate() {
            println!(
                "  {:>3}. {:<11} {} → {}  [{}]",
                step + 1,
                op.rel,
                op.parent_id,
                op.child_id,
                op.rel_id.dimmed()
            );
        }
        for secondary in &component.secondary {
            println!(
                "   +   {:<11} {} → {}  [{}]",
                secondary.rel,
                secondary.parent_id,
                secondary.child_id,
                secondary.rel_id.dimmed()
            );
        }
    }
    if !plan.isolates.is_empty() {
        println!("{} {}", "isolates:".yellow().bold(), plan.isolates.join(", "));
    }
}

pub fn print_template(graph: &OntologyGraph) {
    for node in graph.nodes() {
        let kind = if node.is_rank { "rank".cyan() } else { "term".normal() };
        match &node.term_type {
            Some(term_type) => println!("  {:<5} {}  : {}", kind, node.label.bold(), term_type),
            None => println!("  {:<5} {}", kind, node.label.bold()),
        }
    }
    for row in graph.relationships() {
        let arrow = if row.is_rank { "⇒" } else { "→" };
        println!("  {} {} {}  ({})", row.parent, arrow, row.child, row.rel.dimmed());
    }
}
