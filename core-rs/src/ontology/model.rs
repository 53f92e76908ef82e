/**
 * model.rs
 * The loaded ontology handle: an oxigraph store holding the imports closure
 */

use oxigraph::model::Term;
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use super::query::{QueryResult, SparqlQuery};
use crate::errors::ReasonerError;

/// Ontology IRI plus optional version IRI; both absent for anonymous ontologies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OntologyId {
    pub ontology_iri: Option<String>,
    pub version_iri: Option<String>,
}

impl OntologyId {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn is_anonymous(&self) -> bool {
        self.ontology_iri.is_none()
    }
}

impl fmt::Display for OntologyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.ontology_iri, &self.version_iri) {
            (Some(iri), Some(version)) => write!(f, "OntologyID(<{}> <{}>)", iri, version),
            (Some(iri), None) => write!(f, "OntologyID(<{}>)", iri),
            _ => write!(f, "OntologyID(Anonymous)"),
        }
    }
}

/// Immutable handle to a loaded ontology and its imports closure
pub struct Ontology {
    store: Store,
    id: OntologyId,
    document_iri: String,
    imports: Vec<String>,
}

impl fmt::Debug for Ontology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ontology")
            .field("id", &self.id)
            .field("document_iri", &self.document_iri)
            .field("imports", &self.imports)
            .finish()
    }
}

impl Ontology {
    pub(crate) fn new(store: Store, id: OntologyId, document_iri: String, imports: Vec<String>) -> Self {
        Self {
            store,
            id,
            document_iri,
            imports,
        }
    }

    pub fn id(&self) -> &OntologyId {
        &self.id
    }

    /// IRI the root document was read from
    pub fn document_iri(&self) -> &str {
        &self.document_iri
    }

    /// Documents pulled in through owl:imports, in load order
    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    /// Number of RDF triples in the closure
    pub fn triple_count(&self) -> usize {
        self.store.len().unwrap_or(0)
    }

    /// Execute a SPARQL SELECT or ASK query over the closure
    pub fn query_sparql(&self, query: &SparqlQuery) -> Result<Vec<QueryResult>, ReasonerError> {
        run_select(&self.store, query.as_str())
    }
}

/// Plain string for a term: IRIs without brackets, blank nodes as `_:id`, literal lexical form
pub(crate) fn term_value(term: &Term) -> String {
    match term {
        Term::NamedNode(node) => node.as_str().to_string(),
        Term::BlankNode(node) => format!("_:{}", node.as_str()),
        Term::Literal(literal) => literal.value().to_string(),
        #[allow(unreachable_patterns)]
        other => other.to_string(),
    }
}

pub(crate) fn run_select(store: &Store, query: &str) -> Result<Vec<QueryResult>, ReasonerError> {
    let results = store
        .query(query)
        .map_err(|e| ReasonerError::Query(e.to_string()))?;

    match results {
        QueryResults::Solutions(solutions) => {
            let mut rows = Vec::new();

            for solution in solutions {
                let solution = solution.map_err(|e| ReasonerError::Query(e.to_string()))?;

                let mut row = HashMap::new();
                for (var, term) in solution.iter() {
                    row.insert(var.as_str().to_string(), term_value(term));
                }

                rows.push(row);
            }

            Ok(rows)
        }
        QueryResults::Boolean(result) => {
            let mut row = HashMap::new();
            row.insert("result".to_string(), result.to_string());
            Ok(vec![row])
        }
        QueryResults::Graph(_) => Err(ReasonerError::Query(
            "Graph queries not supported".to_string(),
        )),
    }
}
