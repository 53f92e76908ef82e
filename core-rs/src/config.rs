/**
 * config.rs
 * Parser for ontq.yaml query session files (YAML format)
 *
 * Format:
 * ```yaml
 * apiVersion: ontq/v1
 * kind: QuerySession
 * metadata:
 *   name: pizza-demo
 * spec:
 *   document: http://protege.stanford.edu/ontologies/pizza/pizza.owl
 *   defaultPrefix: http://www.co-ode.org/ontologies/pizza/pizza.owl#
 *   prefixes:
 *     pizza: http://www.co-ode.org/ontologies/pizza/pizza.owl#
 *   reasoner:
 *     followImports: true
 *     missingImports: warn
 *     freshEntities: allow
 *     timeoutSecs: 120
 *   queries:
 *     - kind: consistency
 *     - kind: subClasses
 *       class: :NamedPizza
 *       direct: true
 * ```
 */

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::display::PrefixManager;
use crate::errors::{OntqError, Result};
use crate::ontology::{DocumentSource, LoaderOptions, MissingImportPolicy};
use crate::reasoner::{FreshEntityPolicy, ReasonerConfig, TracingProgressMonitor};

pub const API_VERSION: &str = "ontq/v1";
pub const KIND: &str = "QuerySession";
pub const SESSION_FILE: &str = "ontq.yaml";

const PIZZA_DOCUMENT: &str = "http://protege.stanford.edu/ontologies/pizza/pizza.owl";
const PIZZA_NAMESPACE: &str = "http://www.co-ode.org/ontologies/pizza/pizza.owl#";

/// ontq.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: SessionSpec,
}

/// Session metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Reasoner and loader options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReasonerOptions {
    #[serde(default = "default_follow_imports")]
    pub follow_imports: bool,
    #[serde(default)]
    pub missing_imports: MissingImportPolicy,
    #[serde(default)]
    pub fresh_entities: FreshEntityPolicy,
    /// Precompute deadline; unbounded when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Import IRI -> local file
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub iri_mappings: BTreeMap<String, PathBuf>,
}

fn default_follow_imports() -> bool {
    true
}

impl Default for ReasonerOptions {
    fn default() -> Self {
        Self {
            follow_imports: true,
            missing_imports: MissingImportPolicy::Warn,
            fresh_entities: FreshEntityPolicy::Allow,
            timeout_secs: None,
            iri_mappings: BTreeMap::new(),
        }
    }
}

/// One canned query; entity names are full IRIs or prefixed names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CannedQuery {
    Consistency,
    Unsatisfiable,
    SubClasses {
        class: String,
        #[serde(default)]
        direct: bool,
    },
    Instances {
        class: String,
        #[serde(default)]
        direct: bool,
    },
    PropertyValues {
        individual: String,
        property: String,
    },
    Hierarchy,
}

impl CannedQuery {
    /// Short label used in reports
    pub fn label(&self) -> String {
        match self {
            Self::Consistency => "consistency".to_string(),
            Self::Unsatisfiable => "unsatisfiable classes".to_string(),
            Self::SubClasses { class, direct } => {
                format!("{}subclasses of {}", if *direct { "direct " } else { "" }, class)
            }
            Self::Instances { class, direct } => {
                format!("{}instances of {}", if *direct { "direct " } else { "" }, class)
            }
            Self::PropertyValues { individual, property } => {
                format!("{} values of {}", property, individual)
            }
            Self::Hierarchy => "class hierarchy".to_string(),
        }
    }

    fn names(&self) -> Vec<&str> {
        match self {
            Self::SubClasses { class, .. } | Self::Instances { class, .. } => vec![class.as_str()],
            Self::PropertyValues { individual, property } => vec![individual.as_str(), property.as_str()],
            _ => Vec::new(),
        }
    }
}

/// Session specification
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionSpec {
    /// Path or URL of the ontology document
    pub document: String,
    /// Namespace rendered as `:Local`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub reasoner: ReasonerOptions,
    #[serde(default)]
    pub queries: Vec<CannedQuery>,
}

impl SessionConfig {
    /// Load ontq.yaml from specified path
    ///
    /// # Arguments
    /// * `path` - Path to the session file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(OntqError::Config(format!(
                "Session file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: SessionConfig = serde_yaml::from_str(&content)
            .map_err(|e| OntqError::Config(format!("Invalid {} YAML: {}", SESSION_FILE, e)))?;

        config.validate()?;

        Ok(config)
    }

    /// Load ontq.yaml from a directory
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self> {
        Self::load(dir.as_ref().join(SESSION_FILE))
    }

    /// Validate session structure
    ///
    /// Ensures:
    /// - apiVersion is "ontq/v1"
    /// - kind is "QuerySession"
    /// - metadata.name and spec.document are non-empty
    /// - prefix names are well formed and every query names its entities
    pub fn validate(&self) -> Result<()> {
        if self.api_version != API_VERSION {
            return Err(OntqError::Config(format!(
                "Invalid apiVersion: expected '{}', got '{}'",
                API_VERSION, self.api_version
            )));
        }

        if self.kind != KIND {
            return Err(OntqError::Config(format!(
                "Invalid kind: expected '{}', got '{}'",
                KIND, self.kind
            )));
        }

        if self.metadata.name.is_empty() {
            return Err(OntqError::Config("metadata.name cannot be empty".to_string()));
        }

        if self.spec.document.trim().is_empty() {
            return Err(OntqError::Config("spec.document cannot be empty".to_string()));
        }

        for name in self.spec.prefixes.keys() {
            let valid = name.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && name.chars().all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
            if !valid {
                return Err(OntqError::Config(format!("Invalid prefix name: '{}'", name)));
            }
        }

        if self.spec.reasoner.timeout_secs == Some(0) {
            return Err(OntqError::Config(
                "spec.reasoner.timeoutSecs must be greater than zero".to_string(),
            ));
        }

        for (index, query) in self.spec.queries.iter().enumerate() {
            if query.names().iter().any(|n| n.trim().is_empty()) {
                return Err(OntqError::Config(format!(
                    "spec.queries[{}] ({}) has an empty entity name",
                    index,
                    query.label()
                )));
            }
        }

        Ok(())
    }

    /// Save ontq.yaml to file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        fs::write(path.as_ref(), yaml)?;
        Ok(())
    }

    /// Create a session with no queries
    pub fn new(name: impl Into<String>, document: impl Into<String>) -> Self {
        SessionConfig {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: Metadata {
                name: name.into(),
                description: None,
            },
            spec: SessionSpec {
                document: document.into(),
                default_prefix: None,
                prefixes: BTreeMap::new(),
                reasoner: ReasonerOptions::default(),
                queries: Vec::new(),
            },
        }
    }

    /// The pizza ontology walk-through: consistency, unsatisfiable classes,
    /// direct NamedPizza subclasses, Country instances, FruttiDiMare toppings
    pub fn pizza_demo() -> Self {
        let mut config = Self::new("pizza-demo", PIZZA_DOCUMENT);
        config.metadata.description = Some("Canned queries over the Protege pizza ontology".to_string());
        config.spec.default_prefix = Some(PIZZA_NAMESPACE.to_string());
        config
            .spec
            .prefixes
            .insert("pizza".to_string(), PIZZA_NAMESPACE.to_string());
        config.spec.queries = vec![
            CannedQuery::Consistency,
            CannedQuery::Unsatisfiable,
            CannedQuery::SubClasses {
                class: ":NamedPizza".to_string(),
                direct: true,
            },
            CannedQuery::Instances {
                class: ":Country".to_string(),
                direct: true,
            },
            CannedQuery::PropertyValues {
                individual: ":FruttiDiMare".to_string(),
                property: ":hasTopping".to_string(),
            },
        ];
        config
    }

    /// Prefixes for display and name expansion
    pub fn prefix_manager(&self) -> PrefixManager {
        let mut prefixes = PrefixManager::new();
        if let Some(default) = &self.spec.default_prefix {
            prefixes = prefixes.with_default_namespace(default.clone());
        }
        for (name, namespace) in &self.spec.prefixes {
            prefixes.add_prefix(name.clone(), namespace.clone());
        }
        prefixes
    }

    /// Document source; relative paths resolve against `base_dir`
    pub fn document_source(&self, base_dir: Option<&Path>) -> DocumentSource {
        match (DocumentSource::parse(&self.spec.document), base_dir) {
            (DocumentSource::File(path), Some(base)) if path.is_relative() => DocumentSource::File(base.join(path)),
            (source, _) => source,
        }
    }

    pub fn loader_options(&self) -> LoaderOptions {
        LoaderOptions {
            follow_imports: self.spec.reasoner.follow_imports,
            missing_imports: self.spec.reasoner.missing_imports,
            iri_mappings: self
                .spec
                .reasoner
                .iri_mappings
                .iter()
                .map(|(iri, path)| (iri.clone(), path.clone()))
                .collect(),
            ..LoaderOptions::default()
        }
    }

    /// Reasoner config logging progress through tracing
    pub fn reasoner_config(&self) -> ReasonerConfig {
        ReasonerConfig::new()
            .with_progress_monitor(Arc::new(TracingProgressMonitor))
            .with_fresh_entity_policy(self.spec.reasoner.fresh_entities)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.spec.reasoner.timeout_secs.map(Duration::from_secs)
    }
}
