//! Integration tests for owl:imports resolution
//!
//! Tests that the reasoner sees the whole imports closure:
//! - Imports mapped to local files
//! - file:// imports, including nested ones
//! - Missing import policy (fail or warn)
//! - Loading without following imports

use ontq_core::{
    ClassRef, DocumentSource, IndividualRef, LoadError, LoaderOptions, MissingImportPolicy, OntologyQueryFacade,
    ReasonerConfig, SessionState,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ZOO: &str = "http://example.org/zoo#";

const ANIMALS: &str = r#"
@prefix : <http://example.org/zoo#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/animals> a owl:Ontology .
:Animal a owl:Class .
:Mammal a owl:Class ; rdfs:subClassOf :Animal .
:Bird a owl:Class ; rdfs:subClassOf :Animal .
:Mammal owl:disjointWith :Bird .
"#;

fn class(local: &str) -> ClassRef {
    ClassRef::new(format!("{}{}", ZOO, local))
}

fn individual(local: &str) -> IndividualRef {
    IndividualRef::new(format!("{}{}", ZOO, local))
}

fn zoo_document(imports: &[&str]) -> String {
    let imports: Vec<String> = imports.iter().map(|iri| format!("    owl:imports <{}> ;", iri)).collect();
    format!(
        r#"
@prefix : <http://example.org/zoo#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/zoo> a owl:Ontology ;
{}
    rdfs:label "zoo" .
:Lion a owl:Class ; rdfs:subClassOf :Mammal .
:Penguin a owl:Class ; rdfs:subClassOf :Bird .
:leo a owl:NamedIndividual , :Lion .
:pingu a owl:NamedIndividual , :Penguin .
"#,
        imports.join("\n")
    )
}

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

fn bound(options: LoaderOptions, root: &Path) -> OntologyQueryFacade {
    let mut facade = OntologyQueryFacade::with_loader_options(options);
    facade.load(&DocumentSource::File(root.to_path_buf())).unwrap();
    facade.bind_reasoner(ReasonerConfig::default()).unwrap();
    facade
}

#[test]
fn test_import_mapped_to_local_file() {
    let temp_dir = TempDir::new().unwrap();

    // 1. Write the imported ontology and the importing one
    let animals = write(temp_dir.path(), "animals.ttl", ANIMALS);
    let zoo = write(temp_dir.path(), "zoo.ttl", &zoo_document(&["http://example.org/animals"]));

    // 2. Map the import IRI to the local copy
    let mut options = LoaderOptions {
        missing_imports: MissingImportPolicy::Fail,
        ..LoaderOptions::default()
    };
    options
        .iri_mappings
        .insert("http://example.org/animals".to_string(), animals);

    // 3. The imported hierarchy joins the told one
    let mut facade = bound(options, &zoo);
    let imports = facade.ontology().unwrap().imports().to_vec();
    assert_eq!(imports, vec!["http://example.org/animals".to_string()]);

    let mammals = facade.sub_classes_of(&class("Mammal"), true).unwrap();
    assert!(mammals.contains_entity(&class("Lion")));

    let animals = facade.instances_of(&class("Animal"), false).unwrap().flattened();
    assert!(animals.contains(&individual("leo")));
    assert!(animals.contains(&individual("pingu")));
}

#[test]
fn test_nested_file_imports() {
    let temp_dir = TempDir::new().unwrap();

    // zoo -> birds -> animals, all by file:// IRI
    let animals = write(temp_dir.path(), "animals.ttl", ANIMALS);
    let birds = write(
        temp_dir.path(),
        "birds.ttl",
        &format!(
            r#"
@prefix : <http://example.org/zoo#> .
@prefix owl: <http://www.w3.org/2002/07/owl#> .
@prefix rdfs: <http://www.w3.org/2000/01/rdf-schema#> .

<http://example.org/birds> a owl:Ontology ;
    owl:imports <file://{}> .
:Seabird a owl:Class ; rdfs:subClassOf :Bird .
"#,
            animals.display()
        ),
    );
    let zoo = write(
        temp_dir.path(),
        "zoo.ttl",
        &zoo_document(&[&format!("file://{}", birds.display())]),
    );

    let mut facade = bound(LoaderOptions::default(), &zoo);
    assert_eq!(facade.ontology().unwrap().imports().len(), 2);

    let birds = facade.sub_classes_of(&class("Bird"), true).unwrap();
    assert!(birds.contains_entity(&class("Penguin")));
    assert!(birds.contains_entity(&class("Seabird")));

    // Disjointness from the innermost import still applies
    assert!(facade.unsatisfiable_classes().unwrap().is_empty());
    assert!(facade.is_consistent().unwrap());
}

#[test]
fn test_missing_import_fails_when_required() {
    let temp_dir = TempDir::new().unwrap();
    let zoo = write(
        temp_dir.path(),
        "zoo.ttl",
        &zoo_document(&[&format!("file://{}/absent.ttl", temp_dir.path().display())]),
    );

    let mut facade = OntologyQueryFacade::with_loader_options(LoaderOptions {
        missing_imports: MissingImportPolicy::Fail,
        ..LoaderOptions::default()
    });

    let result = facade.load(&DocumentSource::File(zoo));
    assert!(matches!(result, Err(LoadError::MissingImport(_))));
    assert_eq!(facade.state(), SessionState::Unloaded);
}

#[test]
fn test_missing_import_skipped_with_warning() {
    let temp_dir = TempDir::new().unwrap();
    let zoo = write(
        temp_dir.path(),
        "zoo.ttl",
        &zoo_document(&[&format!("file://{}/absent.ttl", temp_dir.path().display())]),
    );

    let mut facade = bound(LoaderOptions::default(), &zoo);
    assert!(facade.ontology().unwrap().imports().is_empty());

    // Without the import, Mammal is only known through the subclass axiom
    let lions = facade.super_classes_of(&class("Lion"), true).unwrap();
    assert!(lions.contains_entity(&class("Mammal")));
    assert!(facade.is_consistent().unwrap());
}

#[test]
fn test_imports_not_followed() {
    let temp_dir = TempDir::new().unwrap();
    let animals = write(temp_dir.path(), "animals.ttl", ANIMALS);
    let zoo = write(
        temp_dir.path(),
        "zoo.ttl",
        &zoo_document(&[&format!("file://{}", animals.display())]),
    );

    let options = LoaderOptions {
        follow_imports: false,
        missing_imports: MissingImportPolicy::Fail,
        ..LoaderOptions::default()
    };
    let mut facade = bound(options, &zoo);
    assert!(facade.ontology().unwrap().imports().is_empty());

    // Animal never enters the signature
    let supers = facade.super_classes_of(&class("Mammal"), true).unwrap();
    assert!(supers.iter().all(|node| node.is_top()));
}
