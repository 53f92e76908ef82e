/**
 * reasoner module
 *
 * - progress: precompute progress callbacks
 * - taxonomy: class classification into equivalence nodes
 * - realisation: individual types and entailed property values
 * - structural: the structural engine implementing `Reasoner`
 */

pub mod progress;
pub mod realisation;
pub mod structural;
pub mod taxonomy;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::errors::ReasonerError;
use crate::ontology::{ClassRef, IndividualRef, Node, NodeSet, Ontology, PropertyRef};

pub use progress::{NullProgressMonitor, ProgressMonitor, TracingProgressMonitor};
pub use structural::{StructuralReasoner, StructuralReasonerFactory};

/// How queries treat entities that do not occur in the ontology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FreshEntityPolicy {
    /// Treat unknown entities as having no axioms
    #[default]
    Allow,
    /// Fail with `ReasonerError::FreshEntity`
    Disallow,
}

/// Reasoner configuration passed to `ReasonerFactory::create_reasoner`
#[derive(Clone)]
pub struct ReasonerConfig {
    pub progress_monitor: Arc<dyn ProgressMonitor>,
    pub fresh_entity_policy: FreshEntityPolicy,
}

impl ReasonerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_progress_monitor(mut self, monitor: Arc<dyn ProgressMonitor>) -> Self {
        self.progress_monitor = monitor;
        self
    }

    /// Use a closure `(phase, percent)` as the progress callback
    pub fn with_progress_callback<F>(self, callback: F) -> Self
    where
        F: Fn(&str, u8) + Send + Sync + 'static,
    {
        self.with_progress_monitor(Arc::new(callback))
    }

    pub fn with_fresh_entity_policy(mut self, policy: FreshEntityPolicy) -> Self {
        self.fresh_entity_policy = policy;
        self
    }
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            progress_monitor: Arc::new(NullProgressMonitor),
            fresh_entity_policy: FreshEntityPolicy::Allow,
        }
    }
}

impl fmt::Debug for ReasonerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasonerConfig")
            .field("fresh_entity_policy", &self.fresh_entity_policy)
            .finish_non_exhaustive()
    }
}

/// Reasoning engine contract
///
/// A reasoner is bound to one ontology at construction and caches its
/// inferences. Methods take `&mut self`: inferences are computed on first
/// use, and a reasoner must not be queried from two threads at once.
///
/// Hierarchy results form a DAG of equivalence nodes; engines collapse
/// cycles of mutually subsuming classes into a single node.
pub trait Reasoner: Send {
    /// Engine name, for logs and reports
    fn name(&self) -> &str;

    /// Materialise every inference cache. Idempotent.
    fn precompute(&mut self) -> Result<(), ReasonerError>;

    fn is_precomputed(&self) -> bool;

    /// True iff the ontology has at least one model
    fn is_consistent(&mut self) -> Result<bool, ReasonerError>;

    /// The bottom node: owl:Nothing and every class equivalent to it
    fn unsatisfiable_classes(&mut self) -> Result<Node<ClassRef>, ReasonerError>;

    fn top_class_node(&mut self) -> Result<Node<ClassRef>, ReasonerError>;

    fn bottom_class_node(&mut self) -> Result<Node<ClassRef>, ReasonerError> {
        self.unsatisfiable_classes()
    }

    /// Subclass nodes of `class`; only the immediate ones when `direct`
    fn sub_classes(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError>;

    /// Superclass nodes of `class`; only the immediate ones when `direct`
    fn super_classes(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError>;

    /// The node `class` belongs to
    fn equivalent_classes(&mut self, class: &ClassRef) -> Result<Node<ClassRef>, ReasonerError>;

    /// Individuals that are instances of `class`; only those whose most specific types include it when `direct`
    fn instances(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<IndividualRef>, ReasonerError>;

    /// Class nodes `individual` is an instance of
    fn types(&mut self, individual: &IndividualRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError>;

    /// Individuals related to `subject` via `property`, asserted or entailed
    fn object_property_values(
        &mut self,
        subject: &IndividualRef,
        property: &PropertyRef,
    ) -> Result<NodeSet<IndividualRef>, ReasonerError>;

    /// The node of individuals `individual` is owl:sameAs
    fn same_individuals(&mut self, individual: &IndividualRef) -> Result<Node<IndividualRef>, ReasonerError>;
}

/// Builds reasoners over loaded ontologies
pub trait ReasonerFactory: Send + Sync {
    fn name(&self) -> &str;

    /// Bind a reasoner to `ontology`; no inference work happens until precompute or the first query
    fn create_reasoner(
        &self,
        ontology: Arc<Ontology>,
        config: ReasonerConfig,
    ) -> Result<Box<dyn Reasoner>, ReasonerError>;
}
