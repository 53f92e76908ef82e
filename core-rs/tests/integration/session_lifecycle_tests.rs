//! Integration tests for the query session lifecycle
//!
//! Tests the full session flow including:
//! - State transitions and their error cases
//! - Idempotent precompute and deterministic answers
//! - Precompute deadlines
//! - Session file -> canned queries -> rendered report

use ontq_core::report::render;
use ontq_core::{
    Answer, CannedQuery, ClassRef, DocumentSource, FreshEntityPolicy, LoadError, OntologyQueryFacade, OutputFormat,
    QueryRunner, ReasonerConfig, ReasonerError, SessionConfig, SessionState,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const PIZZA: &str = "http://www.co-ode.org/ontologies/pizza/pizza.owl#";

fn fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("core-rs/tests/fixtures/pizza_mini.ttl")
}

fn class(local: &str) -> ClassRef {
    ClassRef::new(format!("{}{}", PIZZA, local))
}

#[test]
fn test_complete_session_lifecycle() {
    let mut facade = OntologyQueryFacade::with_defaults();
    assert_eq!(facade.state(), SessionState::Unloaded);

    // 1. Nothing can be bound or queried before a load
    assert!(matches!(
        facade.bind_reasoner(ReasonerConfig::default()),
        Err(ReasonerError::NoOntology)
    ));
    assert!(matches!(facade.is_consistent(), Err(ReasonerError::NotBound)));

    // 2. Load
    facade.load(&DocumentSource::File(fixture())).unwrap();
    assert_eq!(facade.state(), SessionState::Loaded);
    assert!(matches!(
        facade.sub_classes_of(&class("Pizza"), true),
        Err(ReasonerError::NotBound)
    ));

    // 3. Bind
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();
    assert_eq!(facade.state(), SessionState::ReasonerBound);
    assert_eq!(facade.reasoner_name(), Some("structural"));

    // 4. Precompute, twice
    facade.precompute().unwrap();
    facade.precompute().unwrap();
    assert_eq!(facade.state(), SessionState::Precomputed);

    // 5. No transition leads back
    assert!(matches!(
        facade.load(&DocumentSource::File(fixture())),
        Err(LoadError::AlreadyLoaded)
    ));
    assert!(matches!(
        facade.bind_reasoner(ReasonerConfig::default()),
        Err(ReasonerError::AlreadyBound)
    ));
    assert_eq!(facade.state(), SessionState::Precomputed);
}

#[test]
fn test_missing_document_leaves_session_unloaded() {
    let temp_dir = TempDir::new().unwrap();
    let mut facade = OntologyQueryFacade::with_defaults();

    let result = facade.load(&DocumentSource::File(temp_dir.path().join("absent.owl")));
    assert!(matches!(result, Err(LoadError::NotFound(_))));
    assert_eq!(facade.state(), SessionState::Unloaded);

    // A later load still works
    facade.load(&DocumentSource::File(fixture())).unwrap();
    assert_eq!(facade.state(), SessionState::Loaded);
}

#[test]
fn test_malformed_document_is_a_load_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.ttl");
    std::fs::write(&path, "@prefix : <http://example.org/> .\n:a :b .\n:c").unwrap();

    let mut facade = OntologyQueryFacade::with_defaults();
    let result = facade.load(&DocumentSource::File(path));
    assert!(matches!(result, Err(LoadError::Malformed { .. })));
    assert_eq!(facade.state(), SessionState::Unloaded);
}

#[test]
fn test_first_query_precomputes_lazily() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let config = ReasonerConfig::new().with_progress_callback(move |_phase: &str, _percent: u8| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let mut facade = OntologyQueryFacade::with_defaults();
    facade.load(&DocumentSource::File(fixture())).unwrap();
    facade.bind_reasoner(config).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    assert!(facade.is_consistent().unwrap());
    assert!(calls.load(Ordering::SeqCst) > 0);
    assert_eq!(facade.state(), SessionState::Precomputed);

    // Later calls reuse the caches
    let after_first = calls.load(Ordering::SeqCst);
    facade.precompute().unwrap();
    facade.unsatisfiable_classes().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), after_first);
}

#[test]
fn test_answers_are_deterministic_across_sessions() {
    let run = || {
        let mut facade = OntologyQueryFacade::with_defaults();
        facade.load(&DocumentSource::File(fixture())).unwrap();
        facade.bind_reasoner(ReasonerConfig::default()).unwrap();
        (
            facade.is_consistent().unwrap(),
            facade.unsatisfiable_classes().unwrap(),
            facade.sub_classes_of(&class("Food"), false).unwrap(),
            facade.class_hierarchy().unwrap(),
        )
    };

    assert_eq!(run(), run());
}

#[test]
fn test_fresh_entity_policy() {
    let fresh = class("Calzone");

    // Allow: a fresh class sits between top and bottom
    let mut facade = OntologyQueryFacade::with_defaults();
    facade.load(&DocumentSource::File(fixture())).unwrap();
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();
    assert!(facade.sub_classes_of(&fresh, true).unwrap().is_bottom_singleton());
    assert!(facade.instances_of(&fresh, false).unwrap().is_empty());

    // Disallow: the same query is an error
    let mut strict = OntologyQueryFacade::with_defaults();
    strict.load(&DocumentSource::File(fixture())).unwrap();
    strict
        .bind_reasoner(ReasonerConfig::new().with_fresh_entity_policy(FreshEntityPolicy::Disallow))
        .unwrap();
    assert!(matches!(
        strict.sub_classes_of(&fresh, true),
        Err(ReasonerError::FreshEntity(_))
    ));
}

#[tokio::test]
async fn test_precompute_within_deadline() {
    let mut facade = OntologyQueryFacade::with_defaults();
    facade.load(&DocumentSource::File(fixture())).unwrap();
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();

    let (mut facade, outcome) = facade.precompute_with_timeout(Duration::from_secs(30)).await.unwrap();
    assert!(outcome.is_ok());
    assert_eq!(facade.state(), SessionState::Precomputed);
    assert!(facade.is_consistent().unwrap());
}

#[tokio::test]
async fn test_precompute_deadline_passes() {
    let slowed = Arc::new(AtomicBool::new(false));
    let once = slowed.clone();
    let config = ReasonerConfig::new().with_progress_callback(move |_phase: &str, _percent: u8| {
        if !once.swap(true, Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(500));
        }
    });

    let mut facade = OntologyQueryFacade::with_defaults();
    facade.load(&DocumentSource::File(fixture())).unwrap();
    facade.bind_reasoner(config).unwrap();

    let result = facade.precompute_with_timeout(Duration::from_millis(20)).await;
    assert!(matches!(result, Err(ReasonerError::Timeout(d)) if d == Duration::from_millis(20)));
}

#[test]
fn test_session_file_to_report() {
    let temp_dir = TempDir::new().unwrap();

    // 1. Copy the fixture next to a session file that names it relatively
    std::fs::copy(fixture(), temp_dir.path().join("pizza.ttl")).unwrap();
    let mut session = SessionConfig::pizza_demo();
    session.metadata.name = "local-pizza".to_string();
    session.spec.document = "pizza.ttl".to_string();
    session.spec.queries.push(CannedQuery::Hierarchy);
    session.save(temp_dir.path().join("ontq.yaml")).unwrap();

    // 2. Read it back
    let session = SessionConfig::load_from_dir(temp_dir.path()).unwrap();
    assert_eq!(session.spec.queries.len(), 6);

    // 3. Load, bind and run
    let mut facade = OntologyQueryFacade::with_loader_options(session.loader_options());
    facade.load(&session.document_source(Some(temp_dir.path()))).unwrap();
    facade.bind_reasoner(session.reasoner_config()).unwrap();

    let prefixes = session.prefix_manager();
    let report = QueryRunner::new(&prefixes).run(&session.metadata.name, &mut facade, &session.spec.queries);

    // 4. Every query answers
    assert_eq!(report.failures(), 0);
    assert_eq!(report.outcomes[0].answer, Some(Answer::Boolean(true)));
    match &report.outcomes[1].answer {
        Some(Answer::Classes(classes)) => {
            assert_eq!(classes.iter().cloned().collect::<Vec<_>>(), vec![class("CheeseyVegetableTopping")])
        }
        other => panic!("unexpected answer: {:?}", other),
    }

    // 5. Table output uses short forms
    colored::control::set_override(false);
    let table = render(&report, OutputFormat::Table, &prefixes).unwrap();
    assert!(table.contains("Session: local-pizza"));
    assert!(table.contains("  {:MeatPizza}"));
    assert!(table.contains("  {:VegetarianPizza}"));
    assert!(table.contains("  {:Italy}"));
    assert!(table.contains("  {:Cozze :Mussels}"));
    assert!(table.contains("  :CheeseyVegetableTopping"));

    // 6. Structured output keeps full IRIs
    let json = render(&report, OutputFormat::Json, &prefixes).unwrap();
    assert!(json.contains(&format!("\"{}Prawns\"", PIZZA)));
}
