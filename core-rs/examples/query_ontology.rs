/// Example: Walk the pizza ontology through the query facade
///
/// Loads an ontology document, binds the structural reasoner and prints the
/// classic pizza queries: consistency, unsatisfiable classes, direct
/// NamedPizza subclasses, Country instances and FruttiDiMare toppings.
///
/// Usage:
///   cargo run --example query_ontology
///   cargo run --example query_ontology core-rs/tests/fixtures/pizza_mini.ttl
///   cargo run --example query_ontology pizza.owl --hierarchy

use ontq_core::{
    ClassRef, DocumentSource, EntityFormatter, HierarchyPrinter, IndividualRef, OntologyQueryFacade, PrefixManager,
    PropertyRef, ReasonerConfig,
};
use std::env;

const PIZZA_DOCUMENT: &str = "http://protege.stanford.edu/ontologies/pizza/pizza.owl";
const PIZZA: &str = "http://www.co-ode.org/ontologies/pizza/pizza.owl#";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().skip(1).collect();
    let show_hierarchy = args.iter().any(|a| a == "--hierarchy");
    let document = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(String::as_str)
        .unwrap_or(PIZZA_DOCUMENT);

    let prefixes = PrefixManager::new().with_default_namespace(PIZZA);
    let named = |local: &str| format!("{}{}", PIZZA, local);

    let mut facade = OntologyQueryFacade::with_defaults();
    let ontology = facade.load(&DocumentSource::parse(document))?;
    println!("Loaded ontology: {}", ontology.id());

    facade.bind_reasoner(ReasonerConfig::default())?;
    facade.precompute()?;

    println!("Consistent: {}\n", facade.is_consistent()?);

    let unsat = facade.unsatisfiable_classes()?;
    if unsat.is_empty() {
        println!("There are no unsatisfiable classes");
    } else {
        println!("The following classes are unsatisfiable:");
        for class in &unsat {
            println!("    {}", prefixes.format_class(class));
        }
    }
    println!();

    let subclasses = facade.sub_classes_of(&ClassRef::new(named("NamedPizza")), true)?;
    println!("Direct subclasses of NamedPizza:");
    for node in subclasses.iter() {
        println!("    {}", prefixes.format_class_node(node));
    }
    println!();

    let countries = facade.instances_of(&ClassRef::new(named("Country")), true)?;
    println!("Instances of Country:");
    for individual in countries.flattened() {
        println!("    {}", prefixes.format_individual(&individual));
    }
    println!();

    let toppings = facade.object_property_values(
        &IndividualRef::new(named("FruttiDiMare")),
        &PropertyRef::new(named("hasTopping")),
    )?;
    println!("hasTopping values of FruttiDiMare:");
    for individual in toppings.flattened() {
        println!("    {}", prefixes.format_individual(&individual));
    }

    if show_hierarchy {
        println!("\nClass hierarchy:");
        let root = facade.class_hierarchy()?;
        HierarchyPrinter::new(&prefixes).print(&root, &mut std::io::stdout())?;
    }

    Ok(())
}
