//! ontq - ontology query CLI
//!
//! Loads an ontology, binds the structural reasoner and runs canned queries

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use ontq_core::config::SESSION_FILE;
use ontq_core::report::render;
use ontq_core::{
    CannedQuery, OntologyQueryFacade, OutputFormat, QueryRunner, ReasonerError, SessionConfig,
};

#[derive(Parser)]
#[command(name = "ontq")]
#[command(version)]
#[command(about = "Ontology query facade", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Output format (table, json, yaml)
    #[arg(long, global = true, default_value = "table")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the canned queries of a session file (defaults to ./ontq.yaml, then the pizza demo)
    Run {
        /// Session file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the session's ontology document (path or URL)
        #[arg(long)]
        document: Option<String>,
        /// Precompute deadline in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Check whether an ontology is consistent
    Consistency {
        /// Ontology document (path or URL)
        document: String,
    },
    /// List unsatisfiable classes
    Unsatisfiable {
        /// Ontology document (path or URL)
        document: String,
    },
    /// List subclasses of a class
    Subclasses {
        /// Ontology document (path or URL)
        document: String,
        /// Class IRI or prefixed name (e.g., :NamedPizza)
        class: String,
        /// Only immediate subclasses
        #[arg(long)]
        direct: bool,
    },
    /// List instances of a class
    Instances {
        /// Ontology document (path or URL)
        document: String,
        /// Class IRI or prefixed name
        class: String,
        /// Only individuals whose most specific types include the class
        #[arg(long)]
        direct: bool,
    },
    /// List object property values of an individual
    Values {
        /// Ontology document (path or URL)
        document: String,
        /// Individual IRI or prefixed name
        individual: String,
        /// Object property IRI or prefixed name
        property: String,
    },
    /// Print the inferred class hierarchy
    Hierarchy {
        /// Ontology document (path or URL)
        document: String,
    },
    /// Write a session file with the pizza demo queries
    Init {
        /// Target file or directory (default: ./ontq.yaml)
        path: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// One-query session for the ad-hoc subcommands; prefixes come from ./ontq.yaml when present
fn adhoc_session(document: String, query: CannedQuery) -> SessionConfig {
    let mut config = SessionConfig::new("adhoc", document);
    if let Ok(local) = SessionConfig::load_from_dir(".") {
        config.spec.default_prefix = local.spec.default_prefix;
        config.spec.prefixes = local.spec.prefixes;
        config.spec.reasoner = local.spec.reasoner;
    }
    config.spec.queries = vec![query];
    config
}

/// Load, bind, precompute and run every query; returns false when a query failed
async fn execute_session(
    config: SessionConfig,
    base_dir: Option<&Path>,
    format: OutputFormat,
) -> Result<bool> {
    let source = config.document_source(base_dir);
    let described = source.describe();
    let mut facade = OntologyQueryFacade::with_loader_options(config.loader_options());

    // Loading may block on HTTP, which must stay off the async workers
    let (returned, loaded) = tokio::task::spawn_blocking(move || {
        let outcome = facade.load(&source).map(|_| ());
        (facade, outcome)
    })
    .await
    .context("Loader worker failed")?;
    facade = returned;
    loaded.with_context(|| format!("Failed to load ontology from {}", described))?;

    facade
        .bind_reasoner(config.reasoner_config())
        .context("Failed to bind reasoner")?;

    let (returned, outcome) = match config.timeout() {
        Some(deadline) => facade
            .precompute_with_timeout(deadline)
            .await
            .context("Precompute did not complete")?,
        None => tokio::task::spawn_blocking(move || {
            let outcome = facade.precompute();
            (facade, outcome)
        })
        .await
        .context("Reasoner worker failed")?,
    };
    facade = returned;

    match outcome {
        Ok(()) => info!("Inferences precomputed"),
        // Queries still run: consistency answers false, the rest report the clash
        Err(ReasonerError::Inconsistent(e)) => warn!(witness = %e.witness, "Ontology is inconsistent"),
        Err(e) => return Err(e).context("Failed to precompute inferences"),
    }

    let mut prefixes = config.prefix_manager();
    if prefixes.default_namespace().is_none() {
        if let Some(iri) = facade.ontology_id().and_then(|id| id.ontology_iri.clone()) {
            prefixes = prefixes.with_default_namespace(format!("{}#", iri.trim_end_matches('#')));
        }
    }

    let report = QueryRunner::new(&prefixes).run(&config.metadata.name, &mut facade, &config.spec.queries);
    println!("{}", render(&report, format, &prefixes)?);

    Ok(report.failures() == 0)
}

fn handle_init(path: Option<PathBuf>) -> Result<bool> {
    let target = match path {
        Some(p) if p.is_dir() => p.join(SESSION_FILE),
        Some(p) => p,
        None => PathBuf::from(SESSION_FILE),
    };

    if target.exists() {
        bail!("{} already exists", target.display());
    }

    SessionConfig::pizza_demo()
        .save(&target)
        .with_context(|| format!("Failed to write {}", target.display()))?;

    println!("✓ Session file created");
    println!("  Location: {}", target.display());
    println!("\nRun it with: ontq run --config {}", target.display());
    Ok(true)
}

async fn run(cli: Cli) -> Result<bool> {
    let format = cli.format;

    match cli.command {
        Commands::Run {
            config,
            document,
            timeout,
        } => {
            let (mut session, base_dir) = match config {
                Some(path) => {
                    let session = SessionConfig::load(&path)
                        .with_context(|| format!("Failed to read session file {}", path.display()))?;
                    (session, path.parent().map(Path::to_path_buf))
                }
                None if Path::new(SESSION_FILE).exists() => {
                    (SessionConfig::load(SESSION_FILE)?, Some(PathBuf::from(".")))
                }
                None => (SessionConfig::pizza_demo(), None),
            };

            if let Some(document) = document {
                session.spec.document = document;
            }
            if let Some(secs) = timeout {
                session.spec.reasoner.timeout_secs = Some(secs);
            }
            session.validate()?;

            execute_session(session, base_dir.as_deref(), format).await
        }
        Commands::Consistency { document } => {
            execute_session(adhoc_session(document, CannedQuery::Consistency), None, format).await
        }
        Commands::Unsatisfiable { document } => {
            execute_session(adhoc_session(document, CannedQuery::Unsatisfiable), None, format).await
        }
        Commands::Subclasses {
            document,
            class,
            direct,
        } => {
            let query = CannedQuery::SubClasses { class, direct };
            execute_session(adhoc_session(document, query), None, format).await
        }
        Commands::Instances {
            document,
            class,
            direct,
        } => {
            let query = CannedQuery::Instances { class, direct };
            execute_session(adhoc_session(document, query), None, format).await
        }
        Commands::Values {
            document,
            individual,
            property,
        } => {
            let query = CannedQuery::PropertyValues { individual, property };
            execute_session(adhoc_session(document, query), None, format).await
        }
        Commands::Hierarchy { document } => {
            execute_session(adhoc_session(document, CannedQuery::Hierarchy), None, format).await
        }
        Commands::Init { path } => handle_init(path),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
