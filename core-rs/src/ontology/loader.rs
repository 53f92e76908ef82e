/**
 * loader.rs
 * Ontology document loading: local files, HTTP(S) documents and inline text,
 * parsed into an oxigraph store together with the owl:imports closure
 */

use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::store::Store;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::model::{run_select, Ontology, OntologyId};
use super::query::SparqlQuery;
use crate::errors::LoadError;

const ACCEPT_HEADER: &str =
    "text/turtle, application/rdf+xml;q=0.9, application/n-triples;q=0.8, */*;q=0.1";

/// RDF serializations the loader understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentFormat {
    Turtle,
    NTriples,
    RdfXml,
}

impl DocumentFormat {
    pub fn rdf_format(self) -> RdfFormat {
        match self {
            Self::Turtle => RdfFormat::Turtle,
            Self::NTriples => RdfFormat::NTriples,
            Self::RdfXml => RdfFormat::RdfXml,
        }
    }

    /// Format from a file extension; `.owl` documents are RDF/XML by convention
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "ttl" | "turtle" => Some(Self::Turtle),
            "nt" => Some(Self::NTriples),
            "rdf" | "owl" | "xml" => Some(Self::RdfXml),
            _ => None,
        }
    }

    /// OWL syntaxes that are not RDF serializations
    pub fn is_non_rdf_syntax(extension: &str) -> bool {
        matches!(extension.to_ascii_lowercase().as_str(), "owx" | "ofn" | "omn")
    }

    /// Format from an HTTP Content-Type value (parameters ignored)
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        match RdfFormat::from_media_type(essence)? {
            RdfFormat::Turtle => Some(Self::Turtle),
            RdfFormat::NTriples => Some(Self::NTriples),
            RdfFormat::RdfXml => Some(Self::RdfXml),
            _ => None,
        }
    }

    /// Guess from the first bytes of the document
    pub fn sniff(content: &[u8]) -> Self {
        let head = String::from_utf8_lossy(&content[..content.len().min(512)]);
        let head = head.trim_start_matches('\u{feff}').trim_start();
        if head.starts_with("<?xml") || head.starts_with("<rdf:RDF") {
            Self::RdfXml
        } else {
            Self::Turtle
        }
    }
}

/// Where an ontology document comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Local file
    File(PathBuf),
    /// http://, https:// or file:// URL
    Url(String),
    /// Document text held in memory
    Inline {
        text: String,
        format: DocumentFormat,
        base_iri: String,
    },
}

impl DocumentSource {
    /// Classify a command-line or config reference: URLs stay URLs, anything else is a path
    pub fn parse(reference: &str) -> Self {
        if reference.starts_with("http://")
            || reference.starts_with("https://")
            || reference.starts_with("file://")
        {
            Self::Url(reference.to_string())
        } else {
            Self::File(PathBuf::from(reference))
        }
    }

    pub fn inline(text: impl Into<String>, format: DocumentFormat, base_iri: impl Into<String>) -> Self {
        Self::Inline {
            text: text.into(),
            format,
            base_iri: base_iri.into(),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::File(path) => path.display().to_string(),
            Self::Url(url) => url.clone(),
            Self::Inline { base_iri, .. } => format!("inline document <{}>", base_iri),
        }
    }
}

/// What to do when an owl:imports target cannot be loaded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingImportPolicy {
    /// Abort the load with `LoadError::MissingImport`
    Fail,
    /// Log and continue without the import
    #[default]
    Warn,
}

/// Loader behaviour
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub follow_imports: bool,
    pub missing_imports: MissingImportPolicy,
    /// Import IRI -> local file, consulted before the network
    pub iri_mappings: HashMap<String, PathBuf>,
    pub http_timeout: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            follow_imports: true,
            missing_imports: MissingImportPolicy::Warn,
            iri_mappings: HashMap::new(),
            http_timeout: Duration::from_secs(60),
        }
    }
}

/// Ontology loader contract
///
/// Parses a document into an axiom store with a retrievable ontology identifier.
pub trait OntologyLoader: Send + Sync {
    fn load(&self, source: &DocumentSource) -> Result<Ontology, LoadError>;
}

struct FetchedDocument {
    content: Vec<u8>,
    iri: String,
    format: Option<DocumentFormat>,
}

/// Oxigraph-backed loader
#[derive(Debug, Clone, Default)]
pub struct RdfOntologyLoader {
    options: LoaderOptions,
}

impl RdfOntologyLoader {
    pub fn new(options: LoaderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LoaderOptions {
        &self.options
    }

    fn fetch(&self, source: &DocumentSource) -> Result<FetchedDocument, LoadError> {
        match source {
            DocumentSource::File(path) => read_file(path),
            DocumentSource::Url(url) => {
                if url.starts_with("file://") {
                    read_file(&file_url_to_path(url)?)
                } else {
                    self.fetch_http(url)
                }
            }
            DocumentSource::Inline {
                text,
                format,
                base_iri,
            } => Ok(FetchedDocument {
                content: text.as_bytes().to_vec(),
                iri: base_iri.clone(),
                format: Some(*format),
            }),
        }
    }

    fn fetch_http(&self, url: &str) -> Result<FetchedDocument, LoadError> {
        debug!(url, "Fetching ontology document");

        let unreachable = |reason: String| LoadError::Unreachable {
            source_iri: url.to_string(),
            reason,
        };

        let client = reqwest::blocking::Client::builder()
            .timeout(self.options.http_timeout)
            .build()
            .map_err(|e| unreachable(e.to_string()))?;

        let response = client
            .get(url)
            .header(reqwest::header::ACCEPT, ACCEPT_HEADER)
            .send()
            .map_err(|e| unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(unreachable(format!("HTTP {}", status)));
        }

        let final_iri = response.url().to_string();
        let media_format = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(DocumentFormat::from_media_type);
        let format = media_format.or_else(|| format_from_iri(&final_iri));

        let content = response
            .bytes()
            .map_err(|e| unreachable(e.to_string()))?
            .to_vec();

        Ok(FetchedDocument {
            content,
            iri: final_iri,
            format,
        })
    }

    fn parse_into(&self, store: &Store, document: &FetchedDocument) -> Result<(), LoadError> {
        let format = document
            .format
            .unwrap_or_else(|| DocumentFormat::sniff(&document.content));

        debug!(document = %document.iri, ?format, bytes = document.content.len(), "Parsing ontology document");

        let malformed = |reason: String| LoadError::Malformed {
            document: document.iri.clone(),
            reason,
        };

        let parser = RdfParser::from_format(format.rdf_format())
            .with_base_iri(document.iri.as_str())
            .map_err(|e| malformed(format!("invalid base IRI: {}", e)))?;

        store
            .load_from_reader(parser, document.content.as_slice())
            .map_err(|e| malformed(e.to_string()))
    }

    fn read_header(store: &Store) -> Result<OntologyId, LoadError> {
        let rows = run_select(store, SparqlQuery::ontology_header().as_str())
            .map_err(|e| LoadError::Store(e.to_string()))?;

        let mut headers: Vec<OntologyId> = rows
            .into_iter()
            .map(|row| OntologyId {
                ontology_iri: row.get("ontology").cloned(),
                version_iri: row.get("version").cloned(),
            })
            .collect();
        headers.sort_by(|a, b| a.ontology_iri.cmp(&b.ontology_iri));

        Ok(headers.into_iter().next().unwrap_or_else(OntologyId::anonymous))
    }

    fn pending_imports(store: &Store, seen: &BTreeSet<String>) -> Result<Vec<String>, LoadError> {
        let rows = run_select(store, SparqlQuery::imports().as_str())
            .map_err(|e| LoadError::Store(e.to_string()))?;

        let mut pending: Vec<String> = rows
            .into_iter()
            .filter_map(|row| row.get("import").cloned())
            .filter(|iri| !seen.contains(iri))
            .collect();
        pending.sort();
        pending.dedup();
        Ok(pending)
    }

    fn resolve_import(&self, iri: &str) -> DocumentSource {
        match self.options.iri_mappings.get(iri) {
            Some(path) => DocumentSource::File(path.clone()),
            None => DocumentSource::parse(iri),
        }
    }

    fn load_imports(&self, store: &Store, seen: &mut BTreeSet<String>) -> Result<Vec<String>, LoadError> {
        let mut loaded = Vec::new();

        loop {
            let pending = Self::pending_imports(store, seen)?;
            if pending.is_empty() {
                return Ok(loaded);
            }

            for iri in pending {
                seen.insert(iri.clone());
                let source = self.resolve_import(&iri);

                let result = self
                    .fetch(&source)
                    .and_then(|document| self.parse_into(store, &document));

                match result {
                    Ok(()) => {
                        debug!(import = %iri, "Loaded import");
                        loaded.push(iri);
                    }
                    Err(e) => match self.options.missing_imports {
                        MissingImportPolicy::Fail => {
                            return Err(LoadError::MissingImport(format!("{}: {}", iri, e)));
                        }
                        MissingImportPolicy::Warn => {
                            warn!(import = %iri, error = %e, "Skipping unloadable import");
                        }
                    },
                }
            }
        }
    }
}

impl OntologyLoader for RdfOntologyLoader {
    fn load(&self, source: &DocumentSource) -> Result<Ontology, LoadError> {
        let store = Store::new().map_err(|e| LoadError::Store(e.to_string()))?;

        let root = self.fetch(source)?;
        self.parse_into(&store, &root)?;

        let id = Self::read_header(&store)?;

        let mut seen = BTreeSet::new();
        seen.insert(root.iri.clone());
        if let Some(iri) = &id.ontology_iri {
            seen.insert(iri.clone());
        }

        let imports = if self.options.follow_imports {
            self.load_imports(&store, &mut seen)?
        } else {
            Vec::new()
        };

        let ontology = Ontology::new(store, id, root.iri, imports);
        info!(
            id = %ontology.id(),
            triples = ontology.triple_count(),
            imports = ontology.imports().len(),
            "Loaded ontology"
        );

        Ok(ontology)
    }
}

fn format_from_iri(iri: &str) -> Option<DocumentFormat> {
    let path = iri.split(['?', '#']).next().unwrap_or(iri);
    let file_name = path.rsplit('/').next()?;
    let (_, extension) = file_name.rsplit_once('.')?;
    DocumentFormat::from_extension(extension)
}

/// Percent-decoded local path of a file:// URL
fn file_url_to_path(url: &str) -> Result<PathBuf, LoadError> {
    let unreachable = |reason: &str| LoadError::Unreachable {
        source_iri: url.to_string(),
        reason: reason.to_string(),
    };
    let parsed = Url::parse(url).map_err(|e| unreachable(&e.to_string()))?;
    parsed
        .to_file_path()
        .map_err(|_| unreachable("not a local file URL"))
}

fn read_file(path: &Path) -> Result<FetchedDocument, LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound(path.display().to_string()));
    }

    if path.is_dir() {
        return Err(LoadError::Malformed {
            document: path.display().to_string(),
            reason: "path is a directory".to_string(),
        });
    }

    let extension = path.extension().and_then(|ext| ext.to_str()).unwrap_or("");
    if DocumentFormat::is_non_rdf_syntax(extension) {
        return Err(LoadError::UnsupportedFormat(format!(
            "{} (.{} is not an RDF serialization)",
            path.display(),
            extension
        )));
    }

    let content = fs::read(path)?;
    let absolute = fs::canonicalize(path)?;
    let iri = Url::from_file_path(&absolute).map_err(|_| LoadError::Malformed {
        document: absolute.display().to_string(),
        reason: "path has no file URL form".to_string(),
    })?;

    Ok(FetchedDocument {
        content,
        iri: iri.to_string(),
        format: absolute
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentFormat::from_extension),
    })
}
