//! Entity references and equivalence nodes
//!
//! Entities are identified by their full IRI. A [`Node`] groups entities the
//! reasoner has proven mutually equivalent; a [`NodeSet`] is the result of
//! every hierarchy or retrieval query.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::vocab::{OWL_NOTHING, OWL_THING};

macro_rules! iri_ref {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(iri: impl Into<String>) -> Self {
                Self(iri.into())
            }

            pub fn iri(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "<{}>", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(iri: &str) -> Self {
                Self::new(iri)
            }
        }

        impl From<String> for $name {
            fn from(iri: String) -> Self {
                Self(iri)
            }
        }
    };
}

iri_ref!(
    /// A named class
    ClassRef
);
iri_ref!(
    /// A named individual
    IndividualRef
);
iri_ref!(
    /// An object property
    PropertyRef
);

impl ClassRef {
    /// owl:Thing
    pub fn thing() -> Self {
        Self::new(OWL_THING)
    }

    /// owl:Nothing
    pub fn nothing() -> Self {
        Self::new(OWL_NOTHING)
    }

    pub fn is_thing(&self) -> bool {
        self.0 == OWL_THING
    }

    pub fn is_nothing(&self) -> bool {
        self.0 == OWL_NOTHING
    }
}

/// A maximal set of mutually equivalent entities
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node<T: Ord> {
    entities: BTreeSet<T>,
}

impl<T: Ord + Clone> Node<T> {
    pub fn new(entities: impl IntoIterator<Item = T>) -> Self {
        Self {
            entities: entities.into_iter().collect(),
        }
    }

    pub fn singleton(entity: T) -> Self {
        Self::new([entity])
    }

    pub fn entities(&self) -> &BTreeSet<T> {
        &self.entities
    }

    pub fn contains(&self, entity: &T) -> bool {
        self.entities.contains(entity)
    }

    /// Smallest member; stable across runs
    pub fn representative(&self) -> Option<&T> {
        self.entities.iter().next()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.iter()
    }
}

impl Node<ClassRef> {
    /// The node holding owl:Nothing (and every unsatisfiable class)
    pub fn is_bottom(&self) -> bool {
        self.entities.contains(&ClassRef::nothing())
    }

    /// The node holding owl:Thing
    pub fn is_top(&self) -> bool {
        self.entities.contains(&ClassRef::thing())
    }

    /// Members other than owl:Nothing
    pub fn entities_minus_bottom(&self) -> BTreeSet<ClassRef> {
        self.entities
            .iter()
            .filter(|c| !c.is_nothing())
            .cloned()
            .collect()
    }

    /// Members other than owl:Thing
    pub fn entities_minus_top(&self) -> BTreeSet<ClassRef> {
        self.entities
            .iter()
            .filter(|c| !c.is_thing())
            .cloned()
            .collect()
    }
}

/// A set of equivalence nodes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeSet<T: Ord> {
    nodes: BTreeSet<Node<T>>,
}

impl<T: Ord + Clone> NodeSet<T> {
    pub fn empty() -> Self {
        Self {
            nodes: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, node: Node<T>) {
        self.nodes.insert(node);
    }

    pub fn nodes(&self) -> &BTreeSet<Node<T>> {
        &self.nodes
    }

    pub fn contains_node(&self, node: &Node<T>) -> bool {
        self.nodes.contains(node)
    }

    pub fn contains_entity(&self, entity: &T) -> bool {
        self.nodes.iter().any(|n| n.contains(entity))
    }

    /// Union of all member entities, equivalences dropped
    pub fn flattened(&self) -> BTreeSet<T> {
        self.nodes
            .iter()
            .flat_map(|n| n.iter().cloned())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<T>> {
        self.nodes.iter()
    }

    pub fn is_subset(&self, other: &NodeSet<T>) -> bool {
        self.nodes.is_subset(&other.nodes)
    }
}

impl NodeSet<ClassRef> {
    /// True when the only node is the bottom node (the result for a leaf class)
    pub fn is_bottom_singleton(&self) -> bool {
        self.nodes.len() == 1 && self.nodes.iter().all(|n| n.is_bottom())
    }

    /// Same set without the bottom node
    pub fn without_bottom(&self) -> Self {
        self.nodes.iter().filter(|n| !n.is_bottom()).cloned().collect()
    }
}

impl<T: Ord + Clone> FromIterator<Node<T>> for NodeSet<T> {
    fn from_iter<I: IntoIterator<Item = Node<T>>>(iter: I) -> Self {
        Self {
            nodes: iter.into_iter().collect(),
        }
    }
}

impl<T: Ord + Clone> IntoIterator for NodeSet<T> {
    type Item = Node<T>;
    type IntoIter = std::collections::btree_set::IntoIter<Node<T>>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}
