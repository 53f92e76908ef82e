// Reasoner Contract Tests
//
// These tests verify INVARIANTS that every reasoner engine MUST keep,
// whatever it does internally. They run through the `Reasoner` trait only.
//
// **Problem**: An engine "optimises" a hierarchy walk and silently drops a node
// **Solution**: Contracts that compare the answers against each other


use ontq_core::ontology::AxiomSet;
use ontq_core::{
    ClassRef, DocumentFormat, DocumentSource, Node, NodeSet, OntologyLoader, PropertyRef, RdfOntologyLoader,
    Reasoner, ReasonerConfig, ReasonerFactory, StructuralReasonerFactory,
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

fn pizza_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("core-rs/tests/fixtures/pizza_mini.ttl")
}

/// Every engine the crate ships; a new factory joins the contracts by being listed here
fn factories() -> Vec<Box<dyn ReasonerFactory>> {
    vec![Box::new(StructuralReasonerFactory::new())]
}

fn bind(factory: &dyn ReasonerFactory, source: &DocumentSource) -> (Box<dyn Reasoner>, AxiomSet) {
    let ontology = Arc::new(RdfOntologyLoader::default().load(source).unwrap());
    let axioms = AxiomSet::extract(&ontology).unwrap();
    let reasoner = factory.create_reasoner(ontology, ReasonerConfig::default()).unwrap();
    (reasoner, axioms)
}

fn pizza(factory: &dyn ReasonerFactory) -> (Box<dyn Reasoner>, AxiomSet) {
    bind(factory, &DocumentSource::File(pizza_fixture()))
}

fn signature_classes(axioms: &AxiomSet) -> Vec<ClassRef> {
    axioms
        .classes
        .iter()
        .cloned()
        .chain([ClassRef::thing(), ClassRef::nothing()])
        .collect()
}

/// WHY: Direct answers are a view of the full answer, never extra information
/// BREAKS: Callers that narrow a query with `direct = true`
#[test]
fn direct_subclasses_are_a_subset_of_all_subclasses() {
    for factory in factories() {
        let (mut reasoner, axioms) = pizza(factory.as_ref());
        for class in signature_classes(&axioms) {
            let direct = reasoner.sub_classes(&class, true).unwrap();
            let all = reasoner.sub_classes(&class, false).unwrap();
            assert!(
                direct.is_subset(&all),
                "{}: direct subclasses of {} are not among all subclasses",
                factory.name(),
                class
            );

            let direct = reasoner.super_classes(&class, true).unwrap();
            let all = reasoner.super_classes(&class, false).unwrap();
            assert!(direct.is_subset(&all), "{}: direct supers of {}", factory.name(), class);
        }
    }
}

/// WHY: A direct subclass has no other answer between it and the queried class
/// BREAKS: Hierarchy printing (nodes would appear twice at different depths)
#[test]
fn direct_subclasses_are_redundancy_free() {
    for factory in factories() {
        let (mut reasoner, axioms) = pizza(factory.as_ref());
        for class in signature_classes(&axioms) {
            let direct = reasoner.sub_classes(&class, true).unwrap();
            for node in direct.iter() {
                let Some(member) = node.representative() else {
                    continue;
                };
                let below = reasoner.sub_classes(member, false).unwrap();
                for other in direct.iter().filter(|other| *other != node) {
                    assert!(
                        !below.contains_node(other),
                        "{}: {:?} is redundant under {}",
                        factory.name(),
                        other,
                        class
                    );
                }
            }
        }
    }
}

/// WHY: Every class lives in exactly one equivalence node
/// BREAKS: Result comparison by node (a class in two nodes makes sets ambiguous)
#[test]
fn equivalence_nodes_partition_the_signature() {
    for factory in factories() {
        let (mut reasoner, axioms) = pizza(factory.as_ref());
        for class in signature_classes(&axioms) {
            let node = reasoner.equivalent_classes(&class).unwrap();
            assert!(node.contains(&class), "{}: node of {} misses it", factory.name(), class);
            for member in node.iter() {
                assert_eq!(reasoner.equivalent_classes(member).unwrap(), node);
            }
        }
    }
}

/// WHY: Mutual subsumption is equivalence; cycles must collapse, not loop
/// BREAKS: Hierarchy traversal terminates only over a DAG
#[test]
fn subclass_cycles_collapse_into_one_node() {
    let cyclic = r#"
@prefix : <http://example.org/cycle#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/cycle> a owl:Ontology .
:A a owl:Class ; rdfs:subClassOf :B .
:B a owl:Class ; rdfs:subClassOf :C .
:C a owl:Class ; rdfs:subClassOf :A .
:D a owl:Class ; rdfs:subClassOf :B .
"#;
    let source = DocumentSource::inline(cyclic, DocumentFormat::Turtle, "http://example.org/cycle");
    let class = |local: &str| ClassRef::new(format!("http://example.org/cycle#{}", local));

    for factory in factories() {
        let (mut reasoner, _) = bind(factory.as_ref(), &source);
        let cycle = Node::new([class("A"), class("B"), class("C")]);
        assert_eq!(reasoner.equivalent_classes(&class("A")).unwrap(), cycle);

        let subs = reasoner.sub_classes(&class("C"), true).unwrap();
        assert_eq!(subs, NodeSet::from_iter([Node::singleton(class("D"))]));
        assert!(!subs.contains_node(&cycle));
    }
}

/// WHY: The bottom node holds owl:Nothing plus every unsatisfiable class
/// BREAKS: unsatisfiable_classes() relies on removing exactly the sentinel
#[test]
fn unsatisfiable_node_is_the_bottom_node() {
    for factory in factories() {
        let (mut reasoner, _) = pizza(factory.as_ref());
        let unsat = reasoner.unsatisfiable_classes().unwrap();
        assert!(unsat.is_bottom());
        assert_eq!(unsat, reasoner.bottom_class_node().unwrap());

        let named: BTreeSet<ClassRef> = unsat.entities_minus_bottom();
        assert!(!named.contains(&ClassRef::nothing()));
        assert_eq!(named.len(), unsat.len() - 1);
    }
}

/// WHY: Top and bottom bound the hierarchy
/// BREAKS: Any walk that starts at top or stops at bottom
#[test]
fn top_and_bottom_bound_the_hierarchy() {
    for factory in factories() {
        let (mut reasoner, axioms) = pizza(factory.as_ref());
        let top = reasoner.top_class_node().unwrap();
        assert!(top.contains(&ClassRef::thing()));
        assert!(reasoner.super_classes(&ClassRef::thing(), false).unwrap().is_empty());
        assert!(reasoner.sub_classes(&ClassRef::nothing(), false).unwrap().is_empty());

        for class in axioms.classes.iter().filter(|c| !top.contains(c)) {
            let supers = reasoner.super_classes(class, false).unwrap();
            assert!(supers.contains_node(&top), "{}: {} is not under top", factory.name(), class);
        }
    }
}

/// WHY: Instances of a class are instances of all its superclasses
/// BREAKS: Instance retrieval over a hierarchy
#[test]
fn instances_follow_subsumption() {
    for factory in factories() {
        let (mut reasoner, axioms) = pizza(factory.as_ref());
        for class in &axioms.classes {
            let direct = reasoner.instances(class, true).unwrap();
            let all = reasoner.instances(class, false).unwrap();
            assert!(direct.is_subset(&all));

            for sup in reasoner.super_classes(class, false).unwrap().flattened() {
                let inherited = reasoner.instances(&sup, false).unwrap();
                assert!(all.is_subset(&inherited), "{}: {} ⊄ {}", factory.name(), class, sup);
            }
        }
    }
}

/// WHY: A value of a sub-property is a value of each super-property
/// BREAKS: Queries phrased against the general property
#[test]
fn property_values_follow_sub_properties() {
    for factory in factories() {
        let (mut reasoner, axioms) = pizza(factory.as_ref());
        let individuals: Vec<_> = axioms.individuals.iter().cloned().collect();
        for (sub, sup) in axioms.sub_property_of.iter() {
            for individual in &individuals {
                let narrow = reasoner.object_property_values(individual, sub).unwrap();
                let wide = reasoner.object_property_values(individual, sup).unwrap();
                assert!(narrow.is_subset(&wide), "{}: {} under {}", factory.name(), sub, sup);
            }
        }

        let unknown = PropertyRef::new("http://example.org/none#unrelated");
        let first = &individuals[0];
        assert!(reasoner.object_property_values(first, &unknown).unwrap().is_empty());
    }
}

/// WHY: Entity references print as `<iri>` and compare by IRI
/// BREAKS: Report output and lookups keyed by reference
#[test]
fn class_references_round_trip_through_display() {
    let class = ClassRef::new("http://www.co-ode.org/ontologies/pizza/pizza.owl#Margherita");
    let printed = class.to_string();
    assert_eq!(printed, "<http://www.co-ode.org/ontologies/pizza/pizza.owl#Margherita>");

    let reparsed = ClassRef::new(printed.trim_start_matches('<').trim_end_matches('>'));
    assert_eq!(reparsed, class);
}
