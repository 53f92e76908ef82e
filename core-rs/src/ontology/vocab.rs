//! OWL / RDF vocabulary used by the loader and the reasoner

pub const RDF_NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS_NS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL_NS: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD_NS: &str = "http://www.w3.org/2001/XMLSchema#";

/// owl:Thing - the top class
pub const OWL_THING: &str = "http://www.w3.org/2002/07/owl#Thing";

/// owl:Nothing - the empty class, sentinel of the bottom node
pub const OWL_NOTHING: &str = "http://www.w3.org/2002/07/owl#Nothing";

/// Standard prefixes registered by every prefix manager
pub const STANDARD_PREFIXES: [(&str, &str); 4] = [
    ("owl", OWL_NS),
    ("rdf", RDF_NS),
    ("rdfs", RDFS_NS),
    ("xsd", XSD_NS),
];

/// True for IRIs in the RDF / RDFS / OWL / XSD namespaces.
///
/// Such IRIs appear as objects of `rdf:type` (`owl:Class`, `owl:NamedIndividual`, ...)
/// and must not be mistaken for user classes.
pub fn is_reserved(iri: &str) -> bool {
    (iri.starts_with(OWL_NS) && iri != OWL_THING && iri != OWL_NOTHING)
        || iri.starts_with(RDF_NS)
        || iri.starts_with(RDFS_NS)
        || iri.starts_with(XSD_NS)
}
