//! Canned query runner and report rendering

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::config::CannedQuery;
use crate::display::{EntityFormatter, HierarchyPrinter, PrefixManager};
use crate::errors::Result;
use crate::facade::{HierarchyNode, OntologyQueryFacade};
use crate::ontology::{ClassRef, IndividualRef, NodeSet, PropertyRef};

/// Report output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown output format '{}' (expected table, json or yaml)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Yaml => "yaml",
        };
        f.write_str(name)
    }
}

/// Typed result of one canned query; entities keep their full IRIs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "camelCase")]
pub enum Answer {
    Boolean(bool),
    Classes(BTreeSet<ClassRef>),
    ClassNodes(NodeSet<ClassRef>),
    IndividualNodes(NodeSet<IndividualRef>),
    Hierarchy(HierarchyNode),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryOutcome {
    pub label: String,
    pub query: CannedQuery,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReport {
    pub session: String,
    pub ontology: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoner: Option<String>,
    pub generated_at: DateTime<Utc>,
    pub outcomes: Vec<QueryOutcome>,
}

impl QueryReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_success()).count()
    }
}

/// Executes canned queries against a facade; a failing query is recorded and the run goes on
pub struct QueryRunner<'a> {
    prefixes: &'a PrefixManager,
}

impl<'a> QueryRunner<'a> {
    pub fn new(prefixes: &'a PrefixManager) -> Self {
        Self { prefixes }
    }

    pub fn run(&self, session: &str, facade: &mut OntologyQueryFacade, queries: &[CannedQuery]) -> QueryReport {
        let outcomes = queries
            .iter()
            .map(|query| {
                let label = query.label();
                match self.execute(facade, query) {
                    Ok(answer) => {
                        debug!(query = %label, "Query answered");
                        QueryOutcome {
                            label,
                            query: query.clone(),
                            answer: Some(answer),
                            error: None,
                        }
                    }
                    Err(e) => {
                        warn!(query = %label, error = %e, "Query failed");
                        QueryOutcome {
                            label,
                            query: query.clone(),
                            answer: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect();

        QueryReport {
            session: session.to_string(),
            ontology: facade
                .ontology_id()
                .map(|id| id.to_string())
                .unwrap_or_else(|| "none".to_string()),
            reasoner: facade.reasoner_name().map(str::to_string),
            generated_at: Utc::now(),
            outcomes,
        }
    }

    /// Run a single query
    pub fn execute(&self, facade: &mut OntologyQueryFacade, query: &CannedQuery) -> Result<Answer> {
        let answer = match query {
            CannedQuery::Consistency => Answer::Boolean(facade.is_consistent()?),
            CannedQuery::Unsatisfiable => Answer::Classes(facade.unsatisfiable_classes()?),
            CannedQuery::SubClasses { class, direct } => {
                let class = ClassRef::new(self.prefixes.expand(class)?);
                Answer::ClassNodes(facade.sub_classes_of(&class, *direct)?)
            }
            CannedQuery::Instances { class, direct } => {
                let class = ClassRef::new(self.prefixes.expand(class)?);
                Answer::IndividualNodes(facade.instances_of(&class, *direct)?)
            }
            CannedQuery::PropertyValues { individual, property } => {
                let individual = IndividualRef::new(self.prefixes.expand(individual)?);
                let property = PropertyRef::new(self.prefixes.expand(property)?);
                Answer::IndividualNodes(facade.object_property_values(&individual, &property)?)
            }
            CannedQuery::Hierarchy => Answer::Hierarchy(facade.class_hierarchy()?),
        };
        Ok(answer)
    }
}

/// Render a report in the requested format; `formatter` names entities in table output
pub fn render(report: &QueryReport, format: OutputFormat, formatter: &dyn EntityFormatter) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Yaml => Ok(serde_yaml::to_string(report)?),
        OutputFormat::Table => Ok(render_table(report, formatter)),
    }
}

fn render_table(report: &QueryReport, formatter: &dyn EntityFormatter) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", "Session:".bold(), report.session));
    out.push_str(&format!("{} {}\n", "Ontology:".bold(), report.ontology));
    if let Some(reasoner) = &report.reasoner {
        out.push_str(&format!("{} {}\n", "Reasoner:".bold(), reasoner));
    }
    out.push_str(&format!(
        "{} {}\n",
        "Generated:".bold(),
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));

    for outcome in &report.outcomes {
        out.push('\n');
        out.push_str(&format!("{}\n", outcome.label.cyan().bold()));
        if let Some(error) = &outcome.error {
            out.push_str(&format!("  {} {}\n", "error:".red().bold(), error));
            continue;
        }
        match &outcome.answer {
            Some(answer) => render_answer(&mut out, answer, formatter),
            None => out.push_str("  (no answer)\n"),
        }
    }
    out
}

fn render_answer(out: &mut String, answer: &Answer, formatter: &dyn EntityFormatter) {
    let lines: Vec<String> = match answer {
        Answer::Boolean(value) => {
            let value = if *value { "true".green() } else { "false".red() };
            vec![value.to_string()]
        }
        Answer::Classes(classes) => classes.iter().map(|c| formatter.format_class(c)).collect(),
        Answer::ClassNodes(nodes) => nodes.iter().map(|n| formatter.format_class_node(n)).collect(),
        Answer::IndividualNodes(nodes) => nodes.iter().map(|n| formatter.format_individual_node(n)).collect(),
        Answer::Hierarchy(root) => HierarchyPrinter::new(formatter)
            .render(root)
            .lines()
            .map(str::to_string)
            .collect(),
    };

    if lines.is_empty() {
        out.push_str(&format!("  {}\n", "(none)".dimmed()));
    }
    for line in lines {
        out.push_str(&format!("  {}\n", line));
    }
}
