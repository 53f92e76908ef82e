/**
 * ontology module
 *
 * - vocab: OWL/RDF/RDFS namespace constants
 * - entity: class, individual and property references; equivalence nodes
 * - model: a loaded ontology backed by an Oxigraph store
 * - loader: document fetching, parsing and imports closure
 * - query: SPARQL query builders over the store
 * - axioms: told axioms extracted for the reasoner
 */

pub mod axioms;
pub mod entity;
pub mod loader;
pub mod model;
pub mod query;
pub mod vocab;

pub use axioms::AxiomSet;
pub use entity::{ClassRef, IndividualRef, Node, NodeSet, PropertyRef};
pub use loader::{
    DocumentFormat, DocumentSource, LoaderOptions, MissingImportPolicy, OntologyLoader, RdfOntologyLoader,
};
pub use model::{Ontology, OntologyId};
pub use query::{QueryResult, SparqlQuery};
