//! Structural reasoner
//!
//! Answers queries from the told axioms alone: named-class subsumption,
//! equivalence, disjointness and intersection conjuncts for the TBox;
//! class and property assertions plus property characteristics for the
//! ABox. Existential and universal restrictions are not unfolded.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use super::progress::ProgressMonitor;
use super::realisation::{Realisation, MATERIALISE_PHASE, REALISE_PHASE};
use super::taxonomy::{Taxonomy, CLASSIFY_PHASE};
use super::{FreshEntityPolicy, Reasoner, ReasonerConfig, ReasonerFactory};
use crate::errors::{InconsistencyError, ReasonerError};
use crate::ontology::{AxiomSet, ClassRef, IndividualRef, Node, NodeSet, Ontology, PropertyRef};

const LOAD_PHASE: &str = "Loading axioms";

pub const STRUCTURAL_REASONER: &str = "structural";

#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralReasonerFactory;

impl StructuralReasonerFactory {
    pub fn new() -> Self {
        Self
    }
}

impl ReasonerFactory for StructuralReasonerFactory {
    fn name(&self) -> &str {
        STRUCTURAL_REASONER
    }

    fn create_reasoner(
        &self,
        ontology: Arc<Ontology>,
        config: ReasonerConfig,
    ) -> Result<Box<dyn Reasoner>, ReasonerError> {
        debug!(ontology = %ontology.id(), "Creating structural reasoner");
        Ok(Box::new(StructuralReasoner::new(ontology, config)))
    }
}

/// Everything precompute derives; immutable once built
#[derive(Debug)]
struct Inferences {
    axioms: AxiomSet,
    taxonomy: Taxonomy,
    realisation: Realisation,
    inconsistency: Option<InconsistencyError>,
}

#[derive(Debug)]
pub struct StructuralReasoner {
    ontology: Arc<Ontology>,
    config: ReasonerConfig,
    inferences: Option<Inferences>,
}

impl StructuralReasoner {
    pub fn new(ontology: Arc<Ontology>, config: ReasonerConfig) -> Self {
        Self {
            ontology,
            config,
            inferences: None,
        }
    }

    pub fn ontology(&self) -> &Arc<Ontology> {
        &self.ontology
    }

    fn compute(&self) -> Result<Inferences, ReasonerError> {
        let monitor: &dyn ProgressMonitor = self.config.progress_monitor.as_ref();
        let started = Instant::now();

        monitor.task_started(LOAD_PHASE);
        let axioms = AxiomSet::extract(&self.ontology)?;
        monitor.progress(LOAD_PHASE, 100);
        monitor.task_stopped(LOAD_PHASE);

        monitor.task_started(CLASSIFY_PHASE);
        let taxonomy = Taxonomy::classify(&axioms, monitor);
        monitor.task_stopped(CLASSIFY_PHASE);

        monitor.task_started(REALISE_PHASE);
        monitor.task_started(MATERIALISE_PHASE);
        let realisation = Realisation::realise(&axioms, &taxonomy, monitor);
        monitor.task_stopped(MATERIALISE_PHASE);
        monitor.task_stopped(REALISE_PHASE);

        let inconsistency = if taxonomy.is_satisfiable(&ClassRef::thing()) {
            realisation.inconsistency().cloned()
        } else {
            Some(InconsistencyError {
                witness: format!("{} is unsatisfiable", ClassRef::thing()),
            })
        };

        info!(
            classes = axioms.classes.len(),
            nodes = taxonomy.node_count(),
            individuals = axioms.individuals.len(),
            consistent = inconsistency.is_none(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Precomputed inferences"
        );

        Ok(Inferences {
            axioms,
            taxonomy,
            realisation,
            inconsistency,
        })
    }

    fn inferences(&mut self) -> Result<&Inferences, ReasonerError> {
        if self.inferences.is_none() {
            let inferences = self.compute()?;
            self.inferences = Some(inferences);
        }
        self.inferences
            .as_ref()
            .ok_or_else(|| ReasonerError::Worker("inference cache missing after precompute".to_string()))
    }

    /// Inferences of a consistent ontology; every entailment query goes through here
    fn consistent(&mut self) -> Result<&Inferences, ReasonerError> {
        let inferences = self.inferences()?;
        match &inferences.inconsistency {
            Some(error) => Err(ReasonerError::Inconsistent(error.clone())),
            None => Ok(inferences),
        }
    }

    fn fresh(&self, entity: &str) -> Result<(), ReasonerError> {
        match self.config.fresh_entity_policy {
            FreshEntityPolicy::Allow => Ok(()),
            FreshEntityPolicy::Disallow => Err(ReasonerError::FreshEntity(entity.to_string())),
        }
    }

    fn class_is_known(inferences: &Inferences, class: &ClassRef) -> bool {
        inferences.taxonomy.contains(class)
    }

    fn individual_is_known(inferences: &Inferences, individual: &IndividualRef) -> bool {
        inferences.realisation.contains(individual) || inferences.axioms.individuals.contains(individual)
    }
}

impl Reasoner for StructuralReasoner {
    fn name(&self) -> &str {
        STRUCTURAL_REASONER
    }

    fn precompute(&mut self) -> Result<(), ReasonerError> {
        let inferences = self.inferences()?;
        if let Some(error) = &inferences.inconsistency {
            warn!(witness = %error.witness, "Ontology is inconsistent");
            return Err(ReasonerError::Inconsistent(error.clone()));
        }
        Ok(())
    }

    fn is_precomputed(&self) -> bool {
        self.inferences.is_some()
    }

    fn is_consistent(&mut self) -> Result<bool, ReasonerError> {
        Ok(self.inferences()?.inconsistency.is_none())
    }

    fn unsatisfiable_classes(&mut self) -> Result<Node<ClassRef>, ReasonerError> {
        Ok(self.consistent()?.taxonomy.bottom_node().clone())
    }

    fn top_class_node(&mut self) -> Result<Node<ClassRef>, ReasonerError> {
        Ok(self.consistent()?.taxonomy.top_node().clone())
    }

    fn sub_classes(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError> {
        let inferences = self.consistent()?;
        let taxonomy = &inferences.taxonomy;
        match taxonomy.node_index(class) {
            Some(node) => Ok(taxonomy.sub_nodes(node, direct)),
            None => {
                // A fresh class has no axioms: only owl:Nothing lies below it
                let bottom = taxonomy.bottom_node().clone();
                self.fresh(class.iri())?;
                Ok(NodeSet::from_iter([bottom]))
            }
        }
    }

    fn super_classes(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError> {
        let inferences = self.consistent()?;
        let taxonomy = &inferences.taxonomy;
        match taxonomy.node_index(class) {
            Some(node) => Ok(taxonomy.super_nodes(node, direct)),
            None => {
                let top = taxonomy.top_node().clone();
                self.fresh(class.iri())?;
                Ok(NodeSet::from_iter([top]))
            }
        }
    }

    fn equivalent_classes(&mut self, class: &ClassRef) -> Result<Node<ClassRef>, ReasonerError> {
        let inferences = self.consistent()?;
        if Self::class_is_known(inferences, class) {
            let taxonomy = &inferences.taxonomy;
            let node = taxonomy
                .node_index(class)
                .map(|n| taxonomy.node(n).clone())
                .unwrap_or_else(|| Node::singleton(class.clone()));
            return Ok(node);
        }
        self.fresh(class.iri())?;
        Ok(Node::singleton(class.clone()))
    }

    fn instances(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<IndividualRef>, ReasonerError> {
        let inferences = self.consistent()?;
        match inferences.taxonomy.node_index(class) {
            Some(node) => Ok(inferences.realisation.instances(node, direct)),
            None => {
                self.fresh(class.iri())?;
                Ok(NodeSet::empty())
            }
        }
    }

    fn types(&mut self, individual: &IndividualRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError> {
        let inferences = self.consistent()?;
        if let Some(types) = inferences.realisation.types(individual, direct, &inferences.taxonomy) {
            return Ok(types);
        }
        let top = inferences.taxonomy.top_node().clone();
        self.fresh(individual.iri())?;
        Ok(NodeSet::from_iter([top]))
    }

    fn object_property_values(
        &mut self,
        subject: &IndividualRef,
        property: &PropertyRef,
    ) -> Result<NodeSet<IndividualRef>, ReasonerError> {
        let inferences = self.consistent()?;
        if !Self::individual_is_known(inferences, subject) {
            self.fresh(subject.iri())?;
            return Ok(NodeSet::empty());
        }
        if !inferences.axioms.object_properties.contains(property) {
            let values = inferences.realisation.object_property_values(subject, property);
            if values.is_empty() {
                self.fresh(property.iri())?;
            }
            return Ok(values);
        }
        Ok(inferences.realisation.object_property_values(subject, property))
    }

    fn same_individuals(&mut self, individual: &IndividualRef) -> Result<Node<IndividualRef>, ReasonerError> {
        let inferences = self.consistent()?;
        if let Some(node) = inferences.realisation.same_individuals(individual) {
            return Ok(node.clone());
        }
        self.fresh(individual.iri())?;
        Ok(Node::singleton(individual.clone()))
    }
}
