//! Ontology query facade
//!
//! One loaded ontology plus one bound reasoner behind a narrow, typed query
//! surface. The session moves `Unloaded -> Loaded -> ReasonerBound ->
//! Precomputed`; every transition is one-way.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::errors::{LoadError, ReasonerError};
use crate::ontology::{
    ClassRef, DocumentSource, IndividualRef, LoaderOptions, Node, NodeSet, Ontology, OntologyId, OntologyLoader,
    PropertyRef, RdfOntologyLoader,
};
use crate::reasoner::{Reasoner, ReasonerConfig, ReasonerFactory, StructuralReasonerFactory};

/// Lifecycle of a query session
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    Unloaded,
    Loaded,
    ReasonerBound,
    Precomputed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unloaded => "unloaded",
            Self::Loaded => "loaded",
            Self::ReasonerBound => "reasoner-bound",
            Self::Precomputed => "precomputed",
        };
        f.write_str(name)
    }
}

/// A node of the inferred class hierarchy with its direct subclass nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyNode {
    pub classes: Node<ClassRef>,
    pub children: Vec<HierarchyNode>,
}

impl HierarchyNode {
    /// Depth-first search for the node containing `class`
    pub fn find(&self, class: &ClassRef) -> Option<&HierarchyNode> {
        if self.classes.contains(class) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(class))
    }
}

/// Facade shared between threads; the mutex serialises reasoner access
pub type SharedFacade = Arc<Mutex<OntologyQueryFacade>>;

pub struct OntologyQueryFacade {
    loader: Box<dyn OntologyLoader>,
    factory: Box<dyn ReasonerFactory>,
    ontology: Option<Arc<Ontology>>,
    reasoner: Option<Box<dyn Reasoner>>,
    state: SessionState,
}

impl fmt::Debug for OntologyQueryFacade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OntologyQueryFacade")
            .field("factory", &self.factory.name())
            .field("ontology", &self.ontology.as_ref().map(|o| o.id().to_string()))
            .field("state", &self.state)
            .finish()
    }
}

impl Default for OntologyQueryFacade {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl OntologyQueryFacade {
    /// Create a facade over an explicit loader and reasoner factory
    ///
    /// # Arguments
    ///
    /// * `loader` - parses documents into ontology handles
    /// * `factory` - builds the reasoner bound by `bind_reasoner`
    pub fn new(loader: Box<dyn OntologyLoader>, factory: Box<dyn ReasonerFactory>) -> Self {
        Self {
            loader,
            factory,
            ontology: None,
            reasoner: None,
            state: SessionState::Unloaded,
        }
    }

    /// Oxigraph loader with default options and the structural reasoner
    pub fn with_defaults() -> Self {
        Self::with_loader_options(LoaderOptions::default())
    }

    pub fn with_loader_options(options: LoaderOptions) -> Self {
        Self::new(
            Box::new(RdfOntologyLoader::new(options)),
            Box::new(StructuralReasonerFactory::new()),
        )
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn ontology(&self) -> Option<&Arc<Ontology>> {
        self.ontology.as_ref()
    }

    pub fn ontology_id(&self) -> Option<&OntologyId> {
        self.ontology.as_deref().map(Ontology::id)
    }

    /// Name of the bound reasoner, if any
    pub fn reasoner_name(&self) -> Option<&str> {
        self.reasoner.as_deref().map(|r| r.name())
    }

    /// Fetch and parse an ontology document
    ///
    /// A failed load leaves the session `Unloaded`, so it can be retried.
    ///
    /// # Errors
    ///
    /// * `LoadError::AlreadyLoaded` - the session already holds an ontology
    /// * any loader failure (unreachable, malformed, missing import)
    pub fn load(&mut self, source: &DocumentSource) -> Result<Arc<Ontology>, LoadError> {
        if self.state != SessionState::Unloaded {
            return Err(LoadError::AlreadyLoaded);
        }

        debug!(source = %source.describe(), "Loading ontology");
        let ontology = Arc::new(self.loader.load(source)?);

        info!(
            ontology = %ontology.id(),
            triples = ontology.triple_count(),
            imports = ontology.imports().len(),
            "Session loaded"
        );

        self.ontology = Some(ontology.clone());
        self.state = SessionState::Loaded;
        Ok(ontology)
    }

    /// Bind a reasoner to the loaded ontology; no inference work happens yet
    pub fn bind_reasoner(&mut self, config: ReasonerConfig) -> Result<(), ReasonerError> {
        let ontology = self.ontology.clone().ok_or(ReasonerError::NoOntology)?;
        if self.reasoner.is_some() {
            return Err(ReasonerError::AlreadyBound);
        }

        let reasoner = self.factory.create_reasoner(ontology, config)?;
        info!(reasoner = reasoner.name(), "Reasoner bound");

        self.reasoner = Some(reasoner);
        self.state = SessionState::ReasonerBound;
        Ok(())
    }

    /// Materialise every inference cache. Idempotent.
    pub fn precompute(&mut self) -> Result<(), ReasonerError> {
        let reasoner = self.reasoner.as_mut().ok_or(ReasonerError::NotBound)?;
        reasoner.precompute()?;
        if self.state != SessionState::Precomputed {
            info!("Session precomputed");
            self.state = SessionState::Precomputed;
        }
        Ok(())
    }

    /// Run `precompute` on a blocking worker with a deadline
    ///
    /// On success the facade comes back together with the precompute outcome
    /// (which may itself be an error such as `Inconsistent`). When the deadline
    /// passes first the worker is abandoned, not killed, and the facade with
    /// it: the call fails with `ReasonerError::Timeout`.
    pub async fn precompute_with_timeout(
        mut self,
        timeout: Duration,
    ) -> Result<(Self, Result<(), ReasonerError>), ReasonerError> {
        let worker = tokio::task::spawn_blocking(move || {
            let outcome = self.precompute();
            (self, outcome)
        });

        match tokio::time::timeout(timeout, worker).await {
            Ok(Ok(finished)) => Ok(finished),
            Ok(Err(join_error)) => Err(ReasonerError::Worker(join_error.to_string())),
            Err(_) => {
                warn!(timeout_ms = timeout.as_millis() as u64, "Precompute deadline passed; worker abandoned");
                Err(ReasonerError::Timeout(timeout))
            }
        }
    }

    /// Wrap the facade in the single exclusive lock multi-threaded callers share
    pub fn into_shared(self) -> SharedFacade {
        Arc::new(Mutex::new(self))
    }

    fn query<T>(
        &mut self,
        run: impl FnOnce(&mut dyn Reasoner) -> Result<T, ReasonerError>,
    ) -> Result<T, ReasonerError> {
        let reasoner = self.reasoner.as_mut().ok_or(ReasonerError::NotBound)?;
        let result = run(&mut **reasoner)?;
        // Lazily built caches count as precomputed only when precompute itself would succeed
        if self.state != SessionState::Precomputed && reasoner.is_precomputed() && reasoner.is_consistent()? {
            self.state = SessionState::Precomputed;
        }
        Ok(result)
    }

    /// True iff the ontology has at least one model; stable across calls
    pub fn is_consistent(&mut self) -> Result<bool, ReasonerError> {
        self.query(|r| r.is_consistent())
    }

    /// Unsatisfiable classes, owl:Nothing excluded
    pub fn unsatisfiable_classes(&mut self) -> Result<BTreeSet<ClassRef>, ReasonerError> {
        self.query(|r| Ok(r.unsatisfiable_classes()?.entities_minus_bottom()))
    }

    pub fn sub_classes_of(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError> {
        self.query(|r| r.sub_classes(class, direct))
    }

    pub fn super_classes_of(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError> {
        self.query(|r| r.super_classes(class, direct))
    }

    pub fn equivalent_classes_of(&mut self, class: &ClassRef) -> Result<Node<ClassRef>, ReasonerError> {
        self.query(|r| r.equivalent_classes(class))
    }

    pub fn instances_of(&mut self, class: &ClassRef, direct: bool) -> Result<NodeSet<IndividualRef>, ReasonerError> {
        self.query(|r| r.instances(class, direct))
    }

    pub fn types_of(&mut self, individual: &IndividualRef, direct: bool) -> Result<NodeSet<ClassRef>, ReasonerError> {
        self.query(|r| r.types(individual, direct))
    }

    pub fn object_property_values(
        &mut self,
        subject: &IndividualRef,
        property: &PropertyRef,
    ) -> Result<NodeSet<IndividualRef>, ReasonerError> {
        self.query(|r| r.object_property_values(subject, property))
    }

    pub fn same_individuals_of(&mut self, individual: &IndividualRef) -> Result<Node<IndividualRef>, ReasonerError> {
        self.query(|r| r.same_individuals(individual))
    }

    pub fn top_class_node(&mut self) -> Result<Node<ClassRef>, ReasonerError> {
        self.query(|r| r.top_class_node())
    }

    pub fn bottom_class_node(&mut self) -> Result<Node<ClassRef>, ReasonerError> {
        self.query(|r| r.bottom_class_node())
    }

    /// The inferred hierarchy rooted at the top node; the bottom node is left out
    pub fn class_hierarchy(&mut self) -> Result<HierarchyNode, ReasonerError> {
        self.query(|r| {
            let top = r.top_class_node()?;
            build_hierarchy(r, top)
        })
    }
}

/// Nodes form a DAG, so the recursion terminates; shared subtrees appear under each parent
fn build_hierarchy(reasoner: &mut dyn Reasoner, classes: Node<ClassRef>) -> Result<HierarchyNode, ReasonerError> {
    let mut children = Vec::new();
    if let Some(representative) = classes.representative().cloned() {
        for child in reasoner.sub_classes(&representative, true)?.without_bottom() {
            children.push(build_hierarchy(reasoner, child)?);
        }
    }
    Ok(HierarchyNode { classes, children })
}
