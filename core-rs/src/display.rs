/**
 * display.rs
 * Rendering entities for people: prefix shortening, prefixed-name expansion
 * and the indented class hierarchy printer
 */

use once_cell::sync::OnceCell;
use regex::Regex;
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::io::{self, Write};

use crate::errors::{OntqError, Result};
use crate::facade::HierarchyNode;
use crate::ontology::vocab::STANDARD_PREFIXES;
use crate::ontology::{ClassRef, IndividualRef, Node, PropertyRef};

static PREFIXED_NAME: OnceCell<Regex> = OnceCell::new();

fn prefixed_name() -> Result<&'static Regex> {
    PREFIXED_NAME
        .get_or_try_init(|| Regex::new(r"^([A-Za-z][\w.-]*)?:([^\s<>]*)$"))
        .map_err(|e| OntqError::Config(format!("Regex error: {}", e)))
}

/// Turns IRIs into display names; injected wherever entities are printed
pub trait EntityFormatter: Send + Sync {
    fn format_iri(&self, iri: &str) -> String;

    fn format_class(&self, class: &ClassRef) -> String {
        self.format_iri(class.iri())
    }

    fn format_individual(&self, individual: &IndividualRef) -> String {
        self.format_iri(individual.iri())
    }

    fn format_property(&self, property: &PropertyRef) -> String {
        self.format_iri(property.iri())
    }

    /// `{A B}`
    fn format_class_node(&self, node: &Node<ClassRef>) -> String {
        let members: Vec<String> = node.iter().map(|c| self.format_class(c)).collect();
        format!("{{{}}}", members.join(" "))
    }

    fn format_individual_node(&self, node: &Node<IndividualRef>) -> String {
        let members: Vec<String> = node.iter().map(|i| self.format_individual(i)).collect();
        format!("{{{}}}", members.join(" "))
    }
}

/// Renders every entity as `<iri>`
#[derive(Debug, Clone, Copy, Default)]
pub struct FullIriFormatter;

impl EntityFormatter for FullIriFormatter {
    fn format_iri(&self, iri: &str) -> String {
        format!("<{}>", iri)
    }
}

/// Namespace prefixes for short forms (`:Local`, `pizza:Local`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixManager {
    default_namespace: Option<String>,
    prefixes: BTreeMap<String, String>,
}

impl Default for PrefixManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PrefixManager {
    /// owl, rdf, rdfs and xsd only
    pub fn new() -> Self {
        Self {
            default_namespace: None,
            prefixes: STANDARD_PREFIXES
                .iter()
                .map(|(name, ns)| (name.to_string(), ns.to_string()))
                .collect(),
        }
    }

    pub fn with_default_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.default_namespace = Some(namespace.into());
        self
    }

    pub fn with_prefix(mut self, name: impl Into<String>, namespace: impl Into<String>) -> Self {
        self.add_prefix(name, namespace);
        self
    }

    pub fn add_prefix(&mut self, name: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(name.into(), namespace.into());
    }

    pub fn default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        if prefix.is_empty() {
            return self.default_namespace();
        }
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// Shortest rendering: the longest matching namespace wins (the default namespace on ties),
    /// unmatched IRIs stay `<iri>`
    pub fn short_form(&self, iri: &str) -> String {
        let named = self.prefixes.iter().map(|(name, ns)| (name.as_str(), ns.as_str()));
        let candidates = self
            .default_namespace
            .as_deref()
            .map(|ns| ("", ns))
            .into_iter()
            .chain(named);

        let best = candidates
            .filter_map(|(name, ns)| {
                let local = iri.strip_prefix(ns)?;
                is_local_name(local).then_some((name, ns.len(), local))
            })
            .min_by_key(|(_, len, _)| Reverse(*len));

        match best {
            Some((name, _, local)) => format!("{}:{}", name, local),
            None => format!("<{}>", iri),
        }
    }

    /// Resolve a full IRI, `<iri>`, `prefix:Local` or `:Local` to a full IRI
    pub fn expand(&self, name: &str) -> Result<String> {
        let name = name.trim();
        if let Some(iri) = name.strip_prefix('<').and_then(|n| n.strip_suffix('>')) {
            return Ok(iri.to_string());
        }
        if name.contains("://") || name.starts_with("urn:") {
            return Ok(name.to_string());
        }

        let caps = prefixed_name()?
            .captures(name)
            .ok_or_else(|| OntqError::UnknownPrefix(name.to_string()))?;
        let prefix = caps.get(1).map_or("", |m| m.as_str());
        let local = caps.get(2).map_or("", |m| m.as_str());

        let namespace = self
            .namespace(prefix)
            .ok_or_else(|| OntqError::UnknownPrefix(name.to_string()))?;
        Ok(format!("{}{}", namespace, local))
    }
}

impl EntityFormatter for PrefixManager {
    fn format_iri(&self, iri: &str) -> String {
        self.short_form(iri)
    }
}

fn is_local_name(local: &str) -> bool {
    !local.is_empty() && !local.contains(['/', '#', ':', ' '])
}

/// Prints the inferred hierarchy one node per line, indented by depth
pub struct HierarchyPrinter<'a> {
    formatter: &'a dyn EntityFormatter,
    indent: usize,
}

impl<'a> HierarchyPrinter<'a> {
    pub fn new(formatter: &'a dyn EntityFormatter) -> Self {
        Self { formatter, indent: 4 }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn print(&self, root: &HierarchyNode, out: &mut dyn Write) -> io::Result<()> {
        self.print_node(root, 0, out)
    }

    pub fn render(&self, root: &HierarchyNode) -> String {
        let mut buffer = Vec::new();
        // Writing to a Vec cannot fail
        let _ = self.print(root, &mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }

    fn print_node(&self, node: &HierarchyNode, depth: usize, out: &mut dyn Write) -> io::Result<()> {
        if node.classes.is_bottom() {
            return Ok(());
        }
        writeln!(
            out,
            "{}{}",
            " ".repeat(depth * self.indent),
            self.formatter.format_class_node(&node.classes)
        )?;
        for child in &node.children {
            self.print_node(child, depth + 1, out)?;
        }
        Ok(())
    }
}
