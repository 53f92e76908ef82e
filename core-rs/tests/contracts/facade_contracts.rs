// Facade Contract Tests
//
// These tests verify INVARIANTS of the query session that MUST NEVER BREAK.
//
// **Problem**: A shortcut lets a query run against a half-built session
// **Solution**: Contracts that pin the lifecycle and the error each stage returns


use ontq_core::{
    ClassRef, DocumentFormat, DocumentSource, IndividualRef, LoadError, OntologyQueryFacade, PropertyRef,
    ReasonerConfig, ReasonerError, SessionState,
};

const FARM: &str = r#"
@prefix : <http://example.org/farm#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/farm> a owl:Ontology .
:Animal a owl:Class .
:Cow a owl:Class ; rdfs:subClassOf :Animal .
:Plant a owl:Class .
:Animal owl:disjointWith :Plant .
:MadCow a owl:Class ; rdfs:subClassOf :Cow , :Plant .
:eats a owl:ObjectProperty .
:daisy a owl:NamedIndividual , :Cow ; :eats :grass .
:grass a owl:NamedIndividual , :Plant .
"#;

fn farm() -> DocumentSource {
    DocumentSource::inline(FARM, DocumentFormat::Turtle, "http://example.org/farm")
}

fn class(local: &str) -> ClassRef {
    ClassRef::new(format!("http://example.org/farm#{}", local))
}

fn individual(local: &str) -> IndividualRef {
    IndividualRef::new(format!("http://example.org/farm#{}", local))
}

/// Run every query once and return how many failed with NotBound
fn not_bound_failures(facade: &mut OntologyQueryFacade) -> usize {
    let cow = class("Cow");
    let daisy = individual("daisy");
    let eats = PropertyRef::new("http://example.org/farm#eats");

    let outcomes = [
        facade.is_consistent().err(),
        facade.unsatisfiable_classes().err(),
        facade.sub_classes_of(&cow, true).err(),
        facade.sub_classes_of(&cow, false).err(),
        facade.super_classes_of(&cow, true).err(),
        facade.equivalent_classes_of(&cow).err(),
        facade.instances_of(&cow, true).err(),
        facade.types_of(&daisy, false).err(),
        facade.object_property_values(&daisy, &eats).err(),
        facade.same_individuals_of(&daisy).err(),
        facade.top_class_node().err(),
        facade.bottom_class_node().err(),
        facade.class_hierarchy().err(),
        facade.precompute().err(),
    ];
    outcomes
        .iter()
        .filter(|e| matches!(e, Some(ReasonerError::NotBound)))
        .count()
}

/// WHY: Queries need a bound reasoner; answering from told axioms would be wrong
/// BREAKS: Callers that rely on NotBound to detect a missing bind step
#[test]
fn every_query_requires_a_bound_reasoner() {
    let mut facade = OntologyQueryFacade::with_defaults();
    assert_eq!(not_bound_failures(&mut facade), 14);

    facade.load(&farm()).unwrap();
    assert_eq!(not_bound_failures(&mut facade), 14);
    assert_eq!(facade.state(), SessionState::Loaded);
}

/// WHY: The lifecycle only moves forward
/// BREAKS: A session would answer for one ontology with a reasoner bound to another
#[test]
fn lifecycle_is_one_way() {
    let mut facade = OntologyQueryFacade::with_defaults();
    let mut seen = vec![facade.state()];

    facade.load(&farm()).unwrap();
    seen.push(facade.state());
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();
    seen.push(facade.state());
    facade.precompute().unwrap();
    seen.push(facade.state());

    assert!(seen.windows(2).all(|w| w[0] < w[1]));

    // Rejected transitions leave the state untouched
    assert!(matches!(facade.load(&farm()), Err(LoadError::AlreadyLoaded)));
    assert!(matches!(
        facade.bind_reasoner(ReasonerConfig::default()),
        Err(ReasonerError::AlreadyBound)
    ));
    assert_eq!(facade.state(), SessionState::Precomputed);
}

/// WHY: owl:Nothing is always unsatisfiable, so reporting it carries no information
/// BREAKS: Reports that list "unsatisfiable classes" to people
#[test]
fn unsatisfiable_classes_exclude_nothing() {
    let mut facade = OntologyQueryFacade::with_defaults();
    facade.load(&farm()).unwrap();
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();

    let unsat = facade.unsatisfiable_classes().unwrap();
    assert_eq!(unsat.into_iter().collect::<Vec<_>>(), vec![class("MadCow")]);
    assert!(facade.bottom_class_node().unwrap().contains(&ClassRef::nothing()));
}

/// WHY: An inconsistent ontology entails everything; only the consistency check may answer
/// BREAKS: Callers would act on meaningless answers
#[test]
fn inconsistent_ontology_answers_only_consistency() {
    let clash = FARM.replace(":grass a owl:NamedIndividual , :Plant .", ":daisy a :Plant .");
    let mut facade = OntologyQueryFacade::with_defaults();
    facade
        .load(&DocumentSource::inline(clash, DocumentFormat::Turtle, "http://example.org/farm"))
        .unwrap();
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();

    assert!(matches!(facade.precompute(), Err(ReasonerError::Inconsistent(_))));
    assert_eq!(facade.state(), SessionState::ReasonerBound);
    assert!(!facade.is_consistent().unwrap());
    assert!(!facade.is_consistent().unwrap());

    // A failed precompute is never promoted by later queries
    assert_eq!(facade.state(), SessionState::ReasonerBound);

    assert!(matches!(facade.unsatisfiable_classes(), Err(ReasonerError::Inconsistent(_))));
    assert!(matches!(
        facade.sub_classes_of(&class("Animal"), true),
        Err(ReasonerError::Inconsistent(_))
    ));
    assert!(matches!(
        facade.instances_of(&class("Cow"), false),
        Err(ReasonerError::Inconsistent(_))
    ));
    assert_eq!(facade.state(), SessionState::ReasonerBound);
}

/// WHY: A reasoner must see the ontology exactly as loaded
/// BREAKS: Any answer computed before the load finished
#[test]
fn failed_load_binds_nothing() {
    let mut facade = OntologyQueryFacade::with_defaults();
    let broken = DocumentSource::inline("<a> <b>", DocumentFormat::Turtle, "http://example.org/broken");

    assert!(facade.load(&broken).is_err());
    assert!(facade.ontology().is_none());
    assert!(matches!(
        facade.bind_reasoner(ReasonerConfig::default()),
        Err(ReasonerError::NoOntology)
    ));
    assert_eq!(facade.state(), SessionState::Unloaded);
}
