//! Error types for ontq core

use std::time::Duration;
use thiserror::Error;

/// Failure to fetch or parse an ontology document
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Ontology document not found: {0}")]
    NotFound(String),

    #[error("Ontology document unreachable: {source_iri} ({reason})")]
    Unreachable { source_iri: String, reason: String },

    #[error("Malformed ontology document {document}: {reason}")]
    Malformed { document: String, reason: String },

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Missing import: {0}")]
    MissingImport(String),

    #[error("An ontology is already loaded in this session")]
    AlreadyLoaded,

    #[error("Store error: {0}")]
    Store(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raised when the ontology has no model; further queries are meaningless
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Ontology is inconsistent: {witness}")]
pub struct InconsistencyError {
    /// Human-readable description of the clash that was found
    pub witness: String,
}

/// Failure while binding, precomputing or querying a reasoner
#[derive(Error, Debug)]
pub enum ReasonerError {
    #[error("No ontology loaded; call load() before binding a reasoner")]
    NoOntology,

    #[error("No reasoner bound; call bind_reasoner() before querying")]
    NotBound,

    #[error("A reasoner is already bound to this ontology")]
    AlreadyBound,

    #[error(transparent)]
    Inconsistent(#[from] InconsistencyError),

    #[error("Entity not in ontology signature: {0}")]
    FreshEntity(String),

    #[error("Query error: {0}")]
    Query(String),

    #[error("Precompute did not finish within {0:?}")]
    Timeout(Duration),

    #[error("Reasoner worker failed: {0}")]
    Worker(String),
}

/// Crate-level error
#[derive(Error, Debug)]
pub enum OntqError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Reasoner error: {0}")]
    Reasoner(#[from] ReasonerError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown prefix in name: {0}")]
    UnknownPrefix(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OntqError>;
