//! Individual realisation
//!
//! Merges owl:sameAs individuals into nodes, materialises object property
//! assertions under the property axioms (sub-properties, inverses,
//! symmetry, transitivity), infers types from assertions, domains and
//! ranges, then checks the ABox against the classified taxonomy.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::debug;

use super::progress::{percent, ProgressMonitor};
use super::taxonomy::Taxonomy;
use crate::errors::InconsistencyError;
use crate::ontology::{AxiomSet, ClassRef, IndividualRef, Node, NodeSet, PropertyRef};

pub const REALISE_PHASE: &str = "Realising";
pub const MATERIALISE_PHASE: &str = "Materialising property values";

type Edges = BTreeSet<(usize, usize)>;

#[derive(Debug, Clone)]
pub struct Realisation {
    nodes: Vec<Node<IndividualRef>>,
    node_of: HashMap<IndividualRef, usize>,
    /// Taxonomy node indices per individual node, owl:Thing's node included
    types: Vec<BTreeSet<usize>>,
    direct_types: Vec<BTreeSet<usize>>,
    values: BTreeMap<PropertyRef, Edges>,
    inconsistency: Option<InconsistencyError>,
}

/// Union-find over individual indices
struct Partition {
    parent: Vec<usize>,
}

impl Partition {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, x: usize) -> usize {
        let mut root = x;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cursor = x;
        while self.parent[cursor] != root {
            let next = self.parent[cursor];
            self.parent[cursor] = root;
            cursor = next;
        }
        root
    }

    fn union(&mut self, a: usize, b: usize) {
        let (a, b) = (self.find(a), self.find(b));
        if a != b {
            self.parent[a.max(b)] = a.min(b);
        }
    }
}

impl Realisation {
    pub fn realise(axioms: &AxiomSet, taxonomy: &Taxonomy, monitor: &dyn ProgressMonitor) -> Self {
        let individuals: Vec<&IndividualRef> = axioms.individuals.iter().collect();
        let index: HashMap<&IndividualRef, usize> =
            individuals.iter().enumerate().map(|(i, ind)| (*ind, i)).collect();

        let mut partition = Partition::new(individuals.len());
        for (left, right) in &axioms.same_individuals {
            if let (Some(&l), Some(&r)) = (index.get(left), index.get(right)) {
                partition.union(l, r);
            }
        }

        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for i in 0..individuals.len() {
            members.entry(partition.find(i)).or_default().push(i);
        }

        let mut nodes = Vec::with_capacity(members.len());
        let mut node_of = HashMap::new();
        let mut node_of_index = vec![0; individuals.len()];
        for group in members.into_values() {
            let node = nodes.len();
            for &i in &group {
                node_of.insert(individuals[i].clone(), node);
                node_of_index[i] = node;
            }
            nodes.push(Node::new(group.iter().map(|&i| individuals[i].clone())));
        }
        let node_for = |ind: &IndividualRef| index.get(ind).map(|&i| node_of_index[i]);

        let values = materialise(axioms, &node_for, monitor);

        // Told and entailed class membership, by class IRI
        let mut told: Vec<BTreeSet<&ClassRef>> = vec![BTreeSet::new(); nodes.len()];
        for (individual, class) in &axioms.class_assertions {
            if let Some(n) = node_for(individual) {
                told[n].insert(class);
            }
        }
        for (property, class) in &axioms.property_domains {
            for &(subject, _) in values.get(property).into_iter().flatten() {
                told[subject].insert(class);
            }
        }
        for (property, class) in &axioms.property_ranges {
            for &(_, object) in values.get(property).into_iter().flatten() {
                told[object].insert(class);
            }
        }

        let mut types = Vec::with_capacity(nodes.len());
        let mut direct_types = Vec::with_capacity(nodes.len());
        let mut inconsistency = None;
        let thing = ClassRef::thing();

        for (n, classes) in told.iter().enumerate() {
            let mut entailed: BTreeSet<&ClassRef> = BTreeSet::from([&thing]);
            for class in classes {
                entailed.extend(taxonomy.class_supers(class));
            }

            let node_types: BTreeSet<usize> = entailed
                .iter()
                .filter_map(|class| taxonomy.node_index(class))
                .collect();

            if inconsistency.is_none() {
                inconsistency = check_individual(&nodes[n], &entailed, &node_types, axioms, taxonomy);
            }

            direct_types.push(taxonomy.most_specific(&node_types));
            types.push(node_types);
            monitor.progress(REALISE_PHASE, percent(n + 1, nodes.len()));
        }

        if inconsistency.is_none() {
            inconsistency = axioms
                .different_individuals
                .iter()
                .find(|(left, right)| node_for(left).is_some() && node_for(left) == node_for(right))
                .map(|(left, right)| InconsistencyError {
                    witness: format!("{} is both owl:sameAs and owl:differentFrom {}", left, right),
                });
        }

        debug!(
            nodes = nodes.len(),
            properties = values.len(),
            consistent = inconsistency.is_none(),
            "Realised individuals"
        );

        Self {
            nodes,
            node_of,
            types,
            direct_types,
            values,
            inconsistency,
        }
    }

    pub fn inconsistency(&self) -> Option<&InconsistencyError> {
        self.inconsistency.as_ref()
    }

    pub fn contains(&self, individual: &IndividualRef) -> bool {
        self.node_of.contains_key(individual)
    }

    pub fn same_individuals(&self, individual: &IndividualRef) -> Option<&Node<IndividualRef>> {
        self.node_of.get(individual).map(|&n| &self.nodes[n])
    }

    /// Individuals whose (direct) types include taxonomy node `class_node`
    pub fn instances(&self, class_node: usize, direct: bool) -> NodeSet<IndividualRef> {
        let table = if direct { &self.direct_types } else { &self.types };
        table
            .iter()
            .enumerate()
            .filter(|(_, types)| types.contains(&class_node))
            .map(|(n, _)| self.nodes[n].clone())
            .collect()
    }

    pub fn types(&self, individual: &IndividualRef, direct: bool, taxonomy: &Taxonomy) -> Option<NodeSet<ClassRef>> {
        let n = *self.node_of.get(individual)?;
        let table = if direct { &self.direct_types } else { &self.types };
        Some(table[n].iter().map(|&t| taxonomy.node(t).clone()).collect())
    }

    pub fn object_property_values(&self, subject: &IndividualRef, property: &PropertyRef) -> NodeSet<IndividualRef> {
        let (Some(&n), Some(edges)) = (self.node_of.get(subject), self.values.get(property)) else {
            return NodeSet::empty();
        };
        edges
            .range((n, 0)..=(n, usize::MAX))
            .map(|&(_, object)| self.nodes[object].clone())
            .collect()
    }
}

fn check_individual(
    node: &Node<IndividualRef>,
    entailed: &BTreeSet<&ClassRef>,
    node_types: &BTreeSet<usize>,
    axioms: &AxiomSet,
    taxonomy: &Taxonomy,
) -> Option<InconsistencyError> {
    let individual = node.representative()?;

    if node_types.contains(&taxonomy.bottom_index()) {
        let class = entailed
            .iter()
            .find(|class| !taxonomy.is_satisfiable(class))
            .map(|class| class.to_string())
            .unwrap_or_else(|| ClassRef::nothing().to_string());
        return Some(InconsistencyError {
            witness: format!("{} is an instance of unsatisfiable class {}", individual, class),
        });
    }

    axioms
        .disjoint_classes
        .iter()
        .find(|(a, b)| entailed.contains(a) && entailed.contains(b))
        .map(|(a, b)| InconsistencyError {
            witness: format!("{} is an instance of disjoint classes {} and {}", individual, a, b),
        })
}

/// Apply the property axioms to the asserted edges until nothing changes
fn materialise<F>(axioms: &AxiomSet, node_for: &F, monitor: &dyn ProgressMonitor) -> BTreeMap<PropertyRef, Edges>
where
    F: Fn(&IndividualRef) -> Option<usize>,
{
    let mut values: BTreeMap<PropertyRef, Edges> = BTreeMap::new();
    for (subject, property, object) in &axioms.property_assertions {
        if let (Some(s), Some(o)) = (node_for(subject), node_for(object)) {
            values.entry(property.clone()).or_default().insert((s, o));
        }
    }

    let mut round = 0;
    loop {
        let before: usize = values.values().map(BTreeSet::len).sum();

        for (sub, sup) in &axioms.sub_property_of {
            let edges = values.get(sub).cloned().unwrap_or_default();
            values.entry(sup.clone()).or_default().extend(edges);
        }
        for (left, right) in &axioms.inverse_properties {
            let forward = reversed(values.get(left));
            let backward = reversed(values.get(right));
            values.entry(right.clone()).or_default().extend(forward);
            values.entry(left.clone()).or_default().extend(backward);
        }
        for property in &axioms.symmetric_properties {
            let mirrored = reversed(values.get(property));
            values.entry(property.clone()).or_default().extend(mirrored);
        }
        for property in &axioms.transitive_properties {
            if let Some(edges) = values.get_mut(property) {
                close_transitively(edges);
            }
        }

        round += 1;
        let after: usize = values.values().map(BTreeSet::len).sum();
        monitor.progress(MATERIALISE_PHASE, percent(round, round + 1));
        if after == before {
            break;
        }
    }

    values.retain(|_, edges| !edges.is_empty());
    values
}

fn reversed(edges: Option<&Edges>) -> Vec<(usize, usize)> {
    edges
        .into_iter()
        .flatten()
        .map(|&(s, o)| (o, s))
        .collect()
}

fn close_transitively(edges: &mut Edges) {
    loop {
        let joined: Vec<(usize, usize)> = edges
            .iter()
            .flat_map(|&(a, b)| edges.range((b, 0)..=(b, usize::MAX)).map(move |&(_, c)| (a, c)))
            .filter(|pair| !edges.contains(pair))
            .collect();
        if joined.is_empty() {
            return;
        }
        edges.extend(joined);
    }
}
