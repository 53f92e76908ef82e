//! Class classification
//!
//! Computes the reflexive-transitive closure of the told subsumption graph,
//! collapses mutually subsuming classes into equivalence nodes, moves
//! unsatisfiable classes into the bottom node and derives the transitive
//! reduction (direct sub/super links) over the resulting DAG.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::progress::{percent, ProgressMonitor};
use crate::ontology::{AxiomSet, ClassRef, Node, NodeSet};

pub const CLASSIFY_PHASE: &str = "Classifying";

#[derive(Debug, Clone)]
pub struct Taxonomy {
    classes: Vec<ClassRef>,
    class_index: HashMap<ClassRef, usize>,
    /// Reflexive-transitive superclasses per class index (owl:Thing included)
    class_supers: Vec<BTreeSet<usize>>,
    class_node: Vec<usize>,

    nodes: Vec<Node<ClassRef>>,
    top: usize,
    bottom: usize,
    ancestors: Vec<BTreeSet<usize>>,
    descendants: Vec<BTreeSet<usize>>,
    direct_supers: Vec<BTreeSet<usize>>,
    direct_subs: Vec<BTreeSet<usize>>,
}

impl Taxonomy {
    pub fn classify(axioms: &AxiomSet, monitor: &dyn ProgressMonitor) -> Self {
        let mut signature: BTreeSet<ClassRef> = axioms.classes.clone();
        signature.insert(ClassRef::thing());
        signature.insert(ClassRef::nothing());

        let classes: Vec<ClassRef> = signature.into_iter().collect();
        let class_index: HashMap<ClassRef, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.clone(), i))
            .collect();
        let thing = class_index[&ClassRef::thing()];
        let nothing = class_index[&ClassRef::nothing()];

        let mut told: Vec<Vec<usize>> = vec![Vec::new(); classes.len()];
        for (sub, sup) in &axioms.sub_class_of {
            if let (Some(&s), Some(&p)) = (class_index.get(sub), class_index.get(sup)) {
                told[s].push(p);
            }
        }

        // Closure: every class is below owl:Thing, so the walk also follows Thing's told supers
        let total = classes.len();
        let mut class_supers = Vec::with_capacity(total);
        for start in 0..total {
            let mut reached = BTreeSet::new();
            let mut queue = VecDeque::from([start, thing]);
            while let Some(next) = queue.pop_front() {
                if reached.insert(next) {
                    queue.extend(told[next].iter().copied());
                }
            }
            class_supers.push(reached);
            monitor.progress(CLASSIFY_PHASE, percent(start + 1, total * 2));
        }

        let disjoint: Vec<(usize, usize)> = axioms
            .disjoint_classes
            .iter()
            .filter_map(|(a, b)| Some((*class_index.get(a)?, *class_index.get(b)?)))
            .collect();

        let unsatisfiable = |supers: &BTreeSet<usize>| {
            supers.contains(&nothing)
                || disjoint
                    .iter()
                    .any(|(a, b)| supers.contains(a) && supers.contains(b))
        };

        // Equivalent classes share their closure, so the closure is the grouping key
        let mut bottom_members = BTreeSet::from([nothing]);
        let mut groups: BTreeMap<&BTreeSet<usize>, BTreeSet<usize>> = BTreeMap::new();
        for (index, supers) in class_supers.iter().enumerate() {
            if index == nothing || unsatisfiable(supers) {
                bottom_members.insert(index);
            } else {
                groups.entry(supers).or_default().insert(index);
            }
        }

        let mut nodes = Vec::new();
        let mut class_node = vec![0; total];
        for members in groups.into_values().chain(std::iter::once(bottom_members)) {
            let node_index = nodes.len();
            for &member in &members {
                class_node[member] = node_index;
            }
            nodes.push(Node::new(members.iter().map(|&m| classes[m].clone())));
        }
        let bottom = nodes.len() - 1;
        let top = class_node[thing];

        let satisfiable: Vec<usize> = (0..nodes.len()).filter(|&n| n != bottom).collect();

        let mut ancestors = vec![BTreeSet::new(); nodes.len()];
        for &n in &satisfiable {
            let representative = nodes[n]
                .representative()
                .and_then(|c| class_index.get(c))
                .copied()
                .unwrap_or(thing);
            ancestors[n] = class_supers[representative]
                .iter()
                .map(|&c| class_node[c])
                .filter(|&m| m != n && m != bottom)
                .collect();
        }
        ancestors[bottom] = satisfiable.iter().copied().collect();

        let mut direct_supers = vec![BTreeSet::new(); nodes.len()];
        for (step, &n) in satisfiable.iter().enumerate() {
            direct_supers[n] = ancestors[n]
                .iter()
                .copied()
                .filter(|&a| {
                    !ancestors[n]
                        .iter()
                        .any(|&b| b != a && ancestors[b].contains(&a))
                })
                .collect();
            monitor.progress(CLASSIFY_PHASE, percent(total + step + 1, total * 2));
        }

        let mut direct_subs = vec![BTreeSet::new(); nodes.len()];
        for &n in &satisfiable {
            for &parent in &direct_supers[n] {
                direct_subs[parent].insert(n);
            }
        }

        // The bottom node hangs directly below every leaf
        let leaves: Vec<usize> = satisfiable
            .iter()
            .copied()
            .filter(|&n| direct_subs[n].is_empty())
            .collect();
        for &leaf in &leaves {
            direct_subs[leaf].insert(bottom);
            direct_supers[bottom].insert(leaf);
        }

        let mut descendants = vec![BTreeSet::new(); nodes.len()];
        for &n in &satisfiable {
            for &a in &ancestors[n] {
                descendants[a].insert(n);
            }
            descendants[n].insert(bottom);
        }

        monitor.progress(CLASSIFY_PHASE, 100);

        Self {
            classes,
            class_index,
            class_supers,
            class_node,
            nodes,
            top,
            bottom,
            ancestors,
            descendants,
            direct_supers,
            direct_subs,
        }
    }

    pub fn contains(&self, class: &ClassRef) -> bool {
        self.class_index.contains_key(class)
    }

    pub fn node_index(&self, class: &ClassRef) -> Option<usize> {
        self.class_index.get(class).map(|&c| self.class_node[c])
    }

    pub fn node(&self, index: usize) -> &Node<ClassRef> {
        &self.nodes[index]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn top_index(&self) -> usize {
        self.top
    }

    pub fn bottom_index(&self) -> usize {
        self.bottom
    }

    pub fn top_node(&self) -> &Node<ClassRef> {
        &self.nodes[self.top]
    }

    pub fn bottom_node(&self) -> &Node<ClassRef> {
        &self.nodes[self.bottom]
    }

    pub fn is_satisfiable(&self, class: &ClassRef) -> bool {
        self.node_index(class).map_or(true, |n| n != self.bottom)
    }

    /// Strict ancestor node indices of a node
    pub fn ancestors(&self, node: usize) -> &BTreeSet<usize> {
        &self.ancestors[node]
    }

    /// Superclasses of `class` (reflexive, owl:Thing included); empty for unknown classes
    pub fn class_supers(&self, class: &ClassRef) -> Vec<&ClassRef> {
        self.class_index
            .get(class)
            .map(|&c| self.class_supers[c].iter().map(|&s| &self.classes[s]).collect())
            .unwrap_or_default()
    }

    pub fn sub_nodes(&self, node: usize, direct: bool) -> NodeSet<ClassRef> {
        let indices = if direct {
            &self.direct_subs[node]
        } else {
            &self.descendants[node]
        };
        self.collect(indices)
    }

    pub fn super_nodes(&self, node: usize, direct: bool) -> NodeSet<ClassRef> {
        let indices = if direct {
            &self.direct_supers[node]
        } else {
            &self.ancestors[node]
        };
        self.collect(indices)
    }

    /// Among `candidates`, the nodes no other candidate lies strictly below
    pub fn most_specific(&self, candidates: &BTreeSet<usize>) -> BTreeSet<usize> {
        candidates
            .iter()
            .copied()
            .filter(|&n| {
                !candidates
                    .iter()
                    .any(|&m| m != n && self.ancestors[m].contains(&n))
            })
            .collect()
    }

    fn collect(&self, indices: &BTreeSet<usize>) -> NodeSet<ClassRef> {
        indices.iter().map(|&i| self.nodes[i].clone()).collect()
    }
}
