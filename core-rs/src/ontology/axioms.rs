//! Told axioms, read from the ontology store
//!
//! [`AxiomSet`] is the plain-data view a reasoner works from: the named
//! signature plus every class, property and individual axiom the structural
//! engine understands. Anonymous class expressions other than intersections
//! and complements of named classes are not represented.

use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

use super::entity::{ClassRef, IndividualRef, PropertyRef};
use super::model::Ontology;
use super::query::{QueryResult, SparqlQuery};
use super::vocab;
use crate::errors::ReasonerError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AxiomSet {
    pub classes: BTreeSet<ClassRef>,
    pub individuals: BTreeSet<IndividualRef>,
    pub object_properties: BTreeSet<PropertyRef>,

    /// (sub, sup) - told subsumptions, including equivalences in both directions
    pub sub_class_of: BTreeSet<(ClassRef, ClassRef)>,
    /// Unordered disjoint pairs, stored with the smaller IRI first
    pub disjoint_classes: BTreeSet<(ClassRef, ClassRef)>,

    /// (sub, sup) - told property subsumptions, including equivalences
    pub sub_property_of: BTreeSet<(PropertyRef, PropertyRef)>,
    pub inverse_properties: BTreeSet<(PropertyRef, PropertyRef)>,
    pub symmetric_properties: BTreeSet<PropertyRef>,
    pub transitive_properties: BTreeSet<PropertyRef>,
    pub property_domains: BTreeSet<(PropertyRef, ClassRef)>,
    pub property_ranges: BTreeSet<(PropertyRef, ClassRef)>,

    pub class_assertions: BTreeSet<(IndividualRef, ClassRef)>,
    pub property_assertions: BTreeSet<(IndividualRef, PropertyRef, IndividualRef)>,
    pub same_individuals: BTreeSet<(IndividualRef, IndividualRef)>,
    /// Unordered different pairs, stored with the smaller IRI first
    pub different_individuals: BTreeSet<(IndividualRef, IndividualRef)>,
}

fn column(row: &QueryResult, name: &str) -> Option<String> {
    row.get(name).cloned()
}

fn pairs(ontology: &Ontology, query: SparqlQuery, left: &str, right: &str) -> Result<Vec<(String, String)>, ReasonerError> {
    Ok(ontology
        .query_sparql(&query)?
        .iter()
        .filter_map(|row| Some((column(row, left)?, column(row, right)?)))
        .collect())
}

fn singles(ontology: &Ontology, query: SparqlQuery, name: &str) -> Result<Vec<String>, ReasonerError> {
    Ok(ontology
        .query_sparql(&query)?
        .iter()
        .filter_map(|row| column(row, name))
        .collect())
}

fn ordered<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Group `(key, member)` rows by key
fn grouped(rows: Vec<(String, String)>) -> BTreeMap<String, BTreeSet<String>> {
    let mut groups: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (key, member) in rows {
        groups.entry(key).or_default().insert(member);
    }
    groups
}

impl AxiomSet {
    /// Read every supported axiom out of the ontology's imports closure
    pub fn extract(ontology: &Ontology) -> Result<Self, ReasonerError> {
        let mut axioms = AxiomSet::default();

        for class in singles(ontology, SparqlQuery::declared_classes(), "class")? {
            axioms.add_class(ClassRef::new(class));
        }
        for property in singles(ontology, SparqlQuery::declared_object_properties(), "property")? {
            axioms.object_properties.insert(PropertyRef::new(property));
        }
        for individual in singles(ontology, SparqlQuery::declared_individuals(), "individual")? {
            axioms.individuals.insert(IndividualRef::new(individual));
        }

        // Class axioms
        for (sub, sup) in pairs(ontology, SparqlQuery::sub_class_axioms(), "sub", "sup")? {
            axioms.add_sub_class(ClassRef::new(sub), ClassRef::new(sup));
        }
        for (left, right) in pairs(ontology, SparqlQuery::equivalent_class_axioms(), "left", "right")? {
            axioms.add_equivalent_classes(ClassRef::new(left), ClassRef::new(right));
        }
        for (class, member) in pairs(ontology, SparqlQuery::intersection_conjuncts(), "class", "member")? {
            axioms.add_sub_class(ClassRef::new(class), ClassRef::new(member));
        }
        for (class, negated) in pairs(ontology, SparqlQuery::complement_axioms(), "class", "negated")? {
            axioms.add_disjoint(ClassRef::new(class), ClassRef::new(negated));
        }
        for (left, right) in pairs(ontology, SparqlQuery::disjoint_pairs(), "left", "right")? {
            axioms.add_disjoint(ClassRef::new(left), ClassRef::new(right));
        }
        let all_disjoint = pairs(ontology, SparqlQuery::all_disjoint_members(), "axiom", "member")?;
        for members in grouped(all_disjoint).into_values() {
            axioms.add_pairwise_disjoint(&members);
        }
        let unions = pairs(ontology, SparqlQuery::disjoint_union_members(), "class", "member")?;
        for (class, members) in grouped(unions) {
            for member in &members {
                axioms.add_sub_class(ClassRef::new(member.as_str()), ClassRef::new(class.as_str()));
            }
            axioms.add_pairwise_disjoint(&members);
        }

        // Property axioms
        for (sub, sup) in pairs(ontology, SparqlQuery::sub_property_axioms(), "sub", "sup")? {
            axioms.add_sub_property(PropertyRef::new(sub), PropertyRef::new(sup));
        }
        for (left, right) in pairs(ontology, SparqlQuery::equivalent_property_axioms(), "left", "right")? {
            let (left, right) = (PropertyRef::new(left), PropertyRef::new(right));
            axioms.add_sub_property(left.clone(), right.clone());
            axioms.add_sub_property(right, left);
        }
        for (left, right) in pairs(ontology, SparqlQuery::inverse_property_axioms(), "left", "right")? {
            let (left, right) = (PropertyRef::new(left), PropertyRef::new(right));
            axioms.object_properties.insert(left.clone());
            axioms.object_properties.insert(right.clone());
            axioms.inverse_properties.insert((left, right));
        }
        for property in singles(ontology, SparqlQuery::properties_with_characteristic("SymmetricProperty"), "property")? {
            axioms.symmetric_properties.insert(PropertyRef::new(property));
        }
        for property in singles(ontology, SparqlQuery::properties_with_characteristic("TransitiveProperty"), "property")? {
            axioms.transitive_properties.insert(PropertyRef::new(property));
        }
        for (property, class) in pairs(ontology, SparqlQuery::property_bounds("domain"), "property", "class")? {
            let class = ClassRef::new(class);
            axioms.add_class(class.clone());
            axioms.property_domains.insert((PropertyRef::new(property), class));
        }
        for (property, class) in pairs(ontology, SparqlQuery::property_bounds("range"), "property", "class")? {
            let class = ClassRef::new(class);
            axioms.add_class(class.clone());
            axioms.property_ranges.insert((PropertyRef::new(property), class));
        }

        // Assertions
        for (individual, class) in pairs(ontology, SparqlQuery::class_assertions(), "individual", "class")? {
            if vocab::is_reserved(&class) {
                continue;
            }
            let class = ClassRef::new(class);
            if !axioms.classes.contains(&class) && !class.is_thing() && !class.is_nothing() {
                // Typed by something never declared as a class: punned metadata, not an assertion
                continue;
            }
            let individual = IndividualRef::new(individual);
            axioms.individuals.insert(individual.clone());
            axioms.class_assertions.insert((individual, class));
        }
        for row in ontology.query_sparql(&SparqlQuery::object_property_assertions())? {
            let (Some(subject), Some(property), Some(object)) =
                (column(&row, "subject"), column(&row, "property"), column(&row, "object"))
            else {
                continue;
            };
            let (subject, object) = (IndividualRef::new(subject), IndividualRef::new(object));
            axioms.individuals.insert(subject.clone());
            axioms.individuals.insert(object.clone());
            axioms
                .property_assertions
                .insert((subject, PropertyRef::new(property), object));
        }
        for (left, right) in pairs(ontology, SparqlQuery::individual_relation("sameAs"), "left", "right")? {
            axioms.add_same_individuals(IndividualRef::new(left), IndividualRef::new(right));
        }
        for (left, right) in pairs(ontology, SparqlQuery::individual_relation("differentFrom"), "left", "right")? {
            axioms.add_different_individuals(IndividualRef::new(left), IndividualRef::new(right));
        }
        let all_different = pairs(ontology, SparqlQuery::all_different_members(), "axiom", "member")?;
        for members in grouped(all_different).into_values() {
            let members: Vec<&String> = members.iter().collect();
            for (i, left) in members.iter().enumerate() {
                for right in &members[i + 1..] {
                    axioms.add_different_individuals(
                        IndividualRef::new(left.as_str()),
                        IndividualRef::new(right.as_str()),
                    );
                }
            }
        }

        debug!(
            classes = axioms.classes.len(),
            individuals = axioms.individuals.len(),
            properties = axioms.object_properties.len(),
            subsumptions = axioms.sub_class_of.len(),
            "Extracted axioms"
        );

        Ok(axioms)
    }

    pub fn add_class(&mut self, class: ClassRef) {
        if !vocab::is_reserved(class.iri()) {
            self.classes.insert(class);
        }
    }

    pub fn add_sub_class(&mut self, sub: ClassRef, sup: ClassRef) {
        if vocab::is_reserved(sub.iri()) || vocab::is_reserved(sup.iri()) {
            return;
        }
        self.add_class(sub.clone());
        self.add_class(sup.clone());
        if sub != sup {
            self.sub_class_of.insert((sub, sup));
        }
    }

    pub fn add_equivalent_classes(&mut self, left: ClassRef, right: ClassRef) {
        self.add_sub_class(left.clone(), right.clone());
        self.add_sub_class(right, left);
    }

    pub fn add_disjoint(&mut self, left: ClassRef, right: ClassRef) {
        if vocab::is_reserved(left.iri()) || vocab::is_reserved(right.iri()) {
            return;
        }
        self.add_class(left.clone());
        self.add_class(right.clone());
        self.disjoint_classes.insert(ordered(left, right));
    }

    fn add_pairwise_disjoint(&mut self, members: &BTreeSet<String>) {
        let members: Vec<&String> = members.iter().collect();
        for (i, left) in members.iter().enumerate() {
            for right in &members[i + 1..] {
                self.add_disjoint(ClassRef::new(left.as_str()), ClassRef::new(right.as_str()));
            }
        }
    }

    pub fn add_sub_property(&mut self, sub: PropertyRef, sup: PropertyRef) {
        self.object_properties.insert(sub.clone());
        self.object_properties.insert(sup.clone());
        if sub != sup {
            self.sub_property_of.insert((sub, sup));
        }
    }

    pub fn add_same_individuals(&mut self, left: IndividualRef, right: IndividualRef) {
        self.individuals.insert(left.clone());
        self.individuals.insert(right.clone());
        self.same_individuals.insert((left, right));
    }

    pub fn add_different_individuals(&mut self, left: IndividualRef, right: IndividualRef) {
        self.individuals.insert(left.clone());
        self.individuals.insert(right.clone());
        self.different_individuals.insert(ordered(left, right));
    }
}
