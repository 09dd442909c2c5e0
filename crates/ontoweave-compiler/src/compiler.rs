//! Executes an [`ExecutionPlan`] against ontology instances.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::sync::Arc;

use ontoweave_dsl::markers::CONTAINER_MARKER;
use ontoweave_dsl::{clean_term, strip_html, BindingDirective, InstantiationDirective};
use ontoweave_ontology::{
    OntologyEntity, OntologyError, OntologyGraph, Relationship, TemplateError, TemplateRepository,
};
use tracing::{debug, info, warn};

use crate::config::CompilerConfig;
use crate::error::CompileError;
use crate::input::DiagramInput;
use crate::operation::OperationKind;
use crate::plan::{
    ComponentPlan, ExecutionPlan, OperationGraph, PlannedOperation, RelIdGenerator,
    SecondaryRelationship,
};
use crate::report::{CompiledDiagram, CompiledOntology, ComponentReport, SkippedBinding};

/// Compiles diagrams against templates from `R`.
#[derive(Debug, Clone)]
pub struct Compiler<R> {
    repository: R,
    config: CompilerConfig,
}

impl<R: TemplateRepository> Compiler<R> {
    pub fn new(repository: R) -> Self {
        Self::with_config(repository, CompilerConfig::default())
    }

    pub fn with_config(repository: R, config: CompilerConfig) -> Self {
        Self { repository, config }
    }

    /// The components and operation order [`compile`](Self::compile) would
    /// use, without touching any template.
    pub fn plan(&self, input: &DiagramInput) -> ExecutionPlan {
        let mut rel_ids = RelIdGenerator::new();
        OperationGraph::build(input, &self.config, &mut rel_ids).into_plan()
    }

    /// Compile every component of the diagram.
    ///
    /// A failing component is reported and produces no ontology; the others
    /// are unaffected.
    pub fn compile(&self, input: &DiagramInput) -> CompiledDiagram {
        let mut rel_ids = RelIdGenerator::new();
        let graph = OperationGraph::build(input, &self.config, &mut rel_ids);
        let mut instances = Instances::create(&graph, &self.repository);
        let plan = graph.into_plan();
        let mut references = ReferenceGraphs::new(&self.repository);

        info!(
            components = plan.components.len(),
            isolates = plan.isolates.len(),
            "compiling diagram"
        );

        let mut diagram = CompiledDiagram::default();
        diagram.report.isolates = plan.isolates.clone();
        diagram.report.unplaced = plan.unplaced.iter().map(|r| r.rel_id.clone()).collect();

        for component in &plan.components {
            let mut skipped = Vec::new();
            let error = match self.compile_component(
                component,
                &mut instances,
                &mut references,
                &mut skipped,
            ) {
                Ok(ontology) => {
                    diagram.ontologies.push(ontology);
                    None
                }
                Err(err) => {
                    warn!(root = ?component.root_id, error = %err, "component failed");
                    Some(describe(&err))
                }
            };
            diagram.report.components.push(ComponentReport {
                root_id: component.root_id.clone(),
                operations: component.operations.len(),
                skipped,
                unreached: component.unreached.clone(),
                error,
            });
        }
        diagram
    }

    fn compile_component(
        &self,
        component: &ComponentPlan,
        instances: &mut Instances,
        references: &mut ReferenceGraphs<'_>,
        skipped: &mut Vec<SkippedBinding>,
    ) -> Result<CompiledOntology, CompileError> {
        let root_id = component
            .root_id
            .as_deref()
            .ok_or_else(|| CompileError::NoRoot {
                node_id: component.nodes.first().cloned().unwrap_or_default(),
            })?;

        for operation in &component.operations {
            self.execute(operation, instances, references, skipped)?;
        }
        for relationship in &component.secondary {
            stitch(root_id, relationship, instances)?;
        }

        let root = instances.get_mut(root_id)?;
        let name = root.name().replace(CONTAINER_MARKER, "").trim().to_string();
        let relationships = root.relationships();
        info!(root = %root_id, ontology = %name, relationships = relationships.len(), "component compiled");
        Ok(CompiledOntology {
            root_id: root_id.to_string(),
            name,
            relationships,
        })
    }

    fn execute(
        &self,
        operation: &PlannedOperation,
        instances: &mut Instances,
        references: &mut ReferenceGraphs<'_>,
        skipped: &mut Vec<SkippedBinding>,
    ) -> Result<(), CompileError> {
        debug!(
            rel_id = %operation.rel_id,
            kind = ?operation.kind,
            parent = %operation.parent_id,
            child = %operation.child_id,
            "execute"
        );
        match operation.kind {
            OperationKind::Bind => {
                match instances.bind(&operation.parent_id, &operation.child_id) {
                    Err(CompileError::Ontology(err @ OntologyError::StructuralPath { .. })) => {
                        warn!(rel_id = %operation.rel_id, error = %err, "skipping bind");
                        skipped.push(SkippedBinding {
                            rel_id: operation.rel_id.clone(),
                            parent_id: operation.parent_id.clone(),
                            child_id: operation.child_id.clone(),
                            reason: err.to_string(),
                        });
                        Ok(())
                    }
                    other => other,
                }
            }
            OperationKind::Adopt => {
                let model = clean_term(&operation.child);
                let template = references.get(&self.config.adopt_template)?;
                instances
                    .get_mut(&operation.parent_id)?
                    .adopt(template, &model)?;
                Ok(())
            }
            OperationKind::Define => {
                let directive = BindingDirective::parse(&operation.child).map_err(|source| {
                    CompileError::MalformedTerm {
                        node_id: operation.child_id.clone(),
                        source,
                    }
                })?;
                instances
                    .get_mut(&operation.parent_id)?
                    .define(&directive.variable, &directive.value)?;
                Ok(())
            }
            OperationKind::Link => {
                let (id, variable) = match BindingDirective::parse(&operation.child) {
                    Ok(directive) => (directive.value, Some(directive.variable)),
                    Err(_) => (strip_html(&operation.child), None),
                };
                let template = references.get(&self.config.link_template)?;
                instances.get_mut(&operation.parent_id)?.link_with(
                    template,
                    &id,
                    variable.as_deref(),
                    &self.config.relationship_kinds,
                )?;
                Ok(())
            }
            OperationKind::Place | OperationKind::Other => Ok(()),
        }
    }
}

/// Union each endpoint's graph into the root if it is not there yet, then
/// connect the two instance names.
fn stitch(
    root_id: &str,
    relationship: &SecondaryRelationship,
    instances: &mut Instances,
) -> Result<(), CompileError> {
    let mut endpoints = Vec::with_capacity(2);
    for node_id in [&relationship.parent_id, &relationship.child_id] {
        let entity = instances.get_mut(node_id)?;
        endpoints.push((entity.name().to_string(), entity.graph().clone()));
    }

    let root = instances.get_mut(root_id)?;
    for (name, graph) in &endpoints {
        if !root.graph().contains(name) {
            root.compose_graph(graph);
        }
    }
    let (parent, child) = (&endpoints[0].0, &endpoints[1].0);
    root.add_relationship(
        parent,
        child,
        Relationship::new(relationship.rel.clone(), false),
    );
    debug!(root = %root_id, parent = %parent, child = %child, rel = %relationship.rel, "stitched");
    Ok(())
}

fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// One ontology instance per diagram element carrying an instantiation
/// directive.
struct Instances {
    entities: HashMap<String, OntologyEntity>,
    failed: HashMap<String, Arc<OntologyError>>,
}

impl Instances {
    fn create(graph: &OperationGraph, repository: &dyn TemplateRepository) -> Self {
        let mut entities = HashMap::new();
        let mut failed = HashMap::new();
        for node in graph.nodes() {
            let Ok(directive) = InstantiationDirective::parse(&node.content) else {
                continue;
            };
            match OntologyEntity::instantiate(
                repository,
                &directive.name,
                &directive.base_ontology,
                &directive.self_term,
            ) {
                Ok(entity) => {
                    let entity = entity.with_component(graph.is_component(&node.id));
                    entities.insert(node.id.clone(), entity);
                }
                Err(err) => {
                    warn!(node = %node.id, template = %directive.base_ontology, error = %err, "instantiation failed");
                    failed.insert(node.id.clone(), Arc::new(err));
                }
            }
        }
        debug!(instances = entities.len(), failed = failed.len(), "instantiated diagram");
        Self { entities, failed }
    }

    fn missing(&self, node_id: &str) -> CompileError {
        match self.failed.get(node_id) {
            Some(source) => CompileError::Instantiation {
                node_id: node_id.to_string(),
                source: Arc::clone(source),
            },
            None => CompileError::MissingOntology {
                node_id: node_id.to_string(),
            },
        }
    }

    fn get_mut(&mut self, node_id: &str) -> Result<&mut OntologyEntity, CompileError> {
        if !self.entities.contains_key(node_id) {
            return Err(self.missing(node_id));
        }
        self.entities
            .get_mut(node_id)
            .ok_or_else(|| CompileError::MissingOntology {
                node_id: node_id.to_string(),
            })
    }

    fn bind(&mut self, parent_id: &str, child_id: &str) -> Result<(), CompileError> {
        if parent_id == child_id {
            return Err(CompileError::SelfBinding {
                node_id: parent_id.to_string(),
            });
        }
        let Some(mut child) = self.entities.remove(child_id) else {
            return Err(self.missing(child_id));
        };
        let result = match self.get_mut(parent_id) {
            Ok(parent) => parent.bind(&mut child).map_err(CompileError::from),
            Err(err) => Err(err),
        };
        self.entities.insert(child_id.to_string(), child);
        result
    }
}

/// Reference templates, loaded on first use.
struct ReferenceGraphs<'a> {
    repository: &'a dyn TemplateRepository,
    loaded: HashMap<String, OntologyGraph>,
}

impl<'a> ReferenceGraphs<'a> {
    fn new(repository: &'a dyn TemplateRepository) -> Self {
        Self {
            repository,
            loaded: HashMap::new(),
        }
    }

    fn get(&mut self, name: &str) -> Result<&OntologyGraph, TemplateError> {
        if !self.loaded.contains_key(name) {
            let graph = OntologyGraph::load(self.repository, name)?;
            self.loaded.insert(name.to_string(), graph);
        }
        self.loaded
            .get(name)
            .ok_or_else(|| TemplateError::NotFound {
                name: name.to_string(),
            })
    }
}
