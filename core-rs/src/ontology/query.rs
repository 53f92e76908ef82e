/**
 * query.rs
 * SPARQL builders for reading told axioms out of the ontology store
 */

use std::collections::HashMap;

pub type QueryResult = HashMap<String, String>;

const PREFIXES: &str = r#"
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX owl: <http://www.w3.org/2002/07/owl#>
"#;

pub struct SparqlQuery {
    query: String,
}

impl SparqlQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }

    fn with_prefixes(body: &str) -> Self {
        Self::new(format!("{}{}", PREFIXES, body))
    }

    pub fn as_str(&self) -> &str {
        &self.query
    }

    // =============================================================================
    // Ontology header
    // =============================================================================

    /// Ontology IRI and optional version IRI
    pub fn ontology_header() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?ontology ?version
            WHERE {
                ?ontology rdf:type owl:Ontology .
                OPTIONAL { ?ontology owl:versionIRI ?version }
                FILTER(isIRI(?ontology))
            }
            "#,
        )
    }

    /// Every owl:imports target in the store
    pub fn imports() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?import
            WHERE {
                ?ontology owl:imports ?import .
                FILTER(isIRI(?import))
            }
            "#,
        )
    }

    // =============================================================================
    // Signature
    // =============================================================================

    /// Declared named classes
    pub fn declared_classes() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?class
            WHERE {
                { ?class rdf:type owl:Class } UNION { ?class rdf:type rdfs:Class }
                FILTER(isIRI(?class))
            }
            "#,
        )
    }

    /// Declared object properties (characteristic types imply the declaration)
    pub fn declared_object_properties() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?property
            WHERE {
                ?property rdf:type ?kind .
                VALUES ?kind {
                    owl:ObjectProperty owl:TransitiveProperty owl:SymmetricProperty
                    owl:AsymmetricProperty owl:ReflexiveProperty owl:IrreflexiveProperty
                    owl:InverseFunctionalProperty
                }
                FILTER(isIRI(?property))
            }
            "#,
        )
    }

    /// Declared named individuals
    pub fn declared_individuals() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?individual
            WHERE {
                ?individual rdf:type owl:NamedIndividual .
                FILTER(isIRI(?individual))
            }
            "#,
        )
    }

    // =============================================================================
    // Class axioms
    // =============================================================================

    /// Named rdfs:subClassOf pairs
    pub fn sub_class_axioms() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?sub ?sup
            WHERE {
                ?sub rdfs:subClassOf ?sup .
                FILTER(isIRI(?sub) && isIRI(?sup))
            }
            "#,
        )
    }

    /// Named owl:equivalentClass pairs
    pub fn equivalent_class_axioms() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?left ?right
            WHERE {
                ?left owl:equivalentClass ?right .
                FILTER(isIRI(?left) && isIRI(?right))
            }
            "#,
        )
    }

    /// Named conjuncts of intersections a class is equivalent to or a subclass of
    pub fn intersection_conjuncts() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?class ?member
            WHERE {
                ?class ?relation ?expression .
                VALUES ?relation { owl:equivalentClass rdfs:subClassOf }
                ?expression owl:intersectionOf ?list .
                ?list rdf:rest*/rdf:first ?member .
                FILTER(isIRI(?class) && isIRI(?member))
            }
            "#,
        )
    }

    /// Complements a class is (or is a subclass of), directly or as an intersection conjunct
    pub fn complement_axioms() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?class ?negated
            WHERE {
                {
                    ?class owl:complementOf ?negated .
                } UNION {
                    ?class ?relation ?expression .
                    VALUES ?relation { owl:equivalentClass rdfs:subClassOf }
                    ?expression owl:complementOf ?negated .
                } UNION {
                    ?class ?relation ?expression .
                    VALUES ?relation { owl:equivalentClass rdfs:subClassOf }
                    ?expression owl:intersectionOf ?list .
                    ?list rdf:rest*/rdf:first ?member .
                    ?member owl:complementOf ?negated .
                }
                FILTER(isIRI(?class) && isIRI(?negated))
            }
            "#,
        )
    }

    /// owl:disjointWith pairs
    pub fn disjoint_pairs() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?left ?right
            WHERE {
                ?left owl:disjointWith ?right .
                FILTER(isIRI(?left) && isIRI(?right))
            }
            "#,
        )
    }

    /// Members of owl:AllDisjointClasses axioms, keyed by axiom node
    pub fn all_disjoint_members() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?axiom ?member
            WHERE {
                ?axiom rdf:type owl:AllDisjointClasses ;
                       owl:members ?list .
                ?list rdf:rest*/rdf:first ?member .
                FILTER(isIRI(?member))
            }
            "#,
        )
    }

    /// Members of owl:disjointUnionOf axioms, keyed by the united class
    pub fn disjoint_union_members() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?class ?member
            WHERE {
                ?class owl:disjointUnionOf ?list .
                ?list rdf:rest*/rdf:first ?member .
                FILTER(isIRI(?class) && isIRI(?member))
            }
            "#,
        )
    }

    // =============================================================================
    // Property axioms
    // =============================================================================

    /// rdfs:subPropertyOf pairs
    pub fn sub_property_axioms() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?sub ?sup
            WHERE {
                ?sub rdfs:subPropertyOf ?sup .
                FILTER(isIRI(?sub) && isIRI(?sup))
            }
            "#,
        )
    }

    /// owl:equivalentProperty pairs
    pub fn equivalent_property_axioms() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?left ?right
            WHERE {
                ?left owl:equivalentProperty ?right .
                FILTER(isIRI(?left) && isIRI(?right))
            }
            "#,
        )
    }

    /// owl:inverseOf pairs
    pub fn inverse_property_axioms() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?left ?right
            WHERE {
                ?left owl:inverseOf ?right .
                FILTER(isIRI(?left) && isIRI(?right))
            }
            "#,
        )
    }

    /// Properties typed with a given characteristic (e.g. "TransitiveProperty")
    pub fn properties_with_characteristic(characteristic: &str) -> Self {
        Self::with_prefixes(&format!(
            r#"
            SELECT DISTINCT ?property
            WHERE {{
                ?property rdf:type owl:{} .
                FILTER(isIRI(?property))
            }}
            "#,
            characteristic
        ))
    }

    /// Named rdfs:domain or rdfs:range of properties ("domain" | "range")
    pub fn property_bounds(axis: &str) -> Self {
        Self::with_prefixes(&format!(
            r#"
            SELECT ?property ?class
            WHERE {{
                ?property rdfs:{} ?class .
                FILTER(isIRI(?property) && isIRI(?class))
            }}
            "#,
            axis
        ))
    }

    // =============================================================================
    // Assertions
    // =============================================================================

    /// rdf:type assertions between IRIs
    pub fn class_assertions() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?individual ?class
            WHERE {
                ?individual rdf:type ?class .
                FILTER(isIRI(?individual) && isIRI(?class))
            }
            "#,
        )
    }

    /// Object property assertions between IRIs
    pub fn object_property_assertions() -> Self {
        Self::with_prefixes(
            r#"
            SELECT DISTINCT ?subject ?property ?object
            WHERE {
                ?property rdf:type ?kind .
                VALUES ?kind {
                    owl:ObjectProperty owl:TransitiveProperty owl:SymmetricProperty
                    owl:AsymmetricProperty owl:ReflexiveProperty owl:IrreflexiveProperty
                    owl:InverseFunctionalProperty
                }
                ?subject ?property ?object .
                FILTER(isIRI(?subject) && isIRI(?object))
            }
            "#,
        )
    }

    /// owl:sameAs or owl:differentFrom pairs ("sameAs" | "differentFrom")
    pub fn individual_relation(relation: &str) -> Self {
        Self::with_prefixes(&format!(
            r#"
            SELECT ?left ?right
            WHERE {{
                ?left owl:{} ?right .
                FILTER(isIRI(?left) && isIRI(?right))
            }}
            "#,
            relation
        ))
    }

    /// Members of owl:AllDifferent axioms, keyed by axiom node
    pub fn all_different_members() -> Self {
        Self::with_prefixes(
            r#"
            SELECT ?axiom ?member
            WHERE {
                ?axiom rdf:type owl:AllDifferent .
                { ?axiom owl:members ?list } UNION { ?axiom owl:distinctMembers ?list }
                ?list rdf:rest*/rdf:first ?member .
                FILTER(isIRI(?member))
            }
            "#,
        )
    }
}
