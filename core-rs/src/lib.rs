//! # ontq Core - Ontology Query Facade
//!
//! Loads one ontology document, binds a reasoner to its imports closure and
//! answers a narrow set of typed queries: consistency, unsatisfiable
//! classes, sub-class enumeration, instance retrieval and object property
//! values.
//!
//! ## Session lifecycle
//!
//! ```text
//! Unloaded ──load──▶ Loaded ──bind_reasoner──▶ ReasonerBound ──precompute──▶ Precomputed
//! ```
//!
//! Every transition is one-way. Queries fail with `ReasonerError::NotBound`
//! until a reasoner is bound.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │          OntologyQueryFacade             │
//! └──────────────────────────────────────────┘
//!         │                       │
//!   ┌─────┴─────────┐     ┌───────┴──────────┐
//!   │ OntologyLoader│     │ ReasonerFactory  │
//!   │ (oxigraph)    │     │ (structural)     │
//!   └───────────────┘     └──────────────────┘
//! ```
//!
//! Presentation (prefix short forms, hierarchy printing, report rendering)
//! lives in `display` and `report`, outside the facade.

pub mod config;
pub mod display;
pub mod errors;
pub mod facade;
pub mod ontology;
pub mod reasoner;
pub mod report;

pub use config::{CannedQuery, SessionConfig};
pub use display::{EntityFormatter, FullIriFormatter, HierarchyPrinter, PrefixManager};
pub use errors::{InconsistencyError, LoadError, OntqError, ReasonerError};
pub use facade::{HierarchyNode, OntologyQueryFacade, SessionState, SharedFacade};
pub use ontology::{
    ClassRef, DocumentFormat, DocumentSource, IndividualRef, LoaderOptions, MissingImportPolicy, Node, NodeSet,
    Ontology, OntologyId, OntologyLoader, PropertyRef, RdfOntologyLoader,
};
pub use reasoner::{
    FreshEntityPolicy, ProgressMonitor, Reasoner, ReasonerConfig, ReasonerFactory, StructuralReasoner,
    StructuralReasonerFactory,
};
pub use report::{Answer, OutputFormat, QueryOutcome, QueryReport, QueryRunner};

/// Version of the ontq session format and library
pub const VERSION: &str = "0.4.2";
