//! Output formatting for CLI commands.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::analysis::token::Token;
use crate::cli::args::{OutputFormat, PaviseArgs};
use crate::error::{ConfigIssue, Result};
use crate::mapping::resolver::ResolvedField;

/// Results that know how to print themselves for a human reader.
pub trait HumanOutput: Serialize {
    fn print_human(&self);
}

/// Result structure for mapping validation.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub types: Vec<String>,
    pub analyzers: Vec<String>,
    pub custom_components: usize,
    pub issues: Vec<String>,
}

impl ValidationReport {
    pub fn failed(issues: &[ConfigIssue]) -> Self {
        ValidationReport {
            valid: false,
            types: Vec::new(),
            analyzers: Vec::new(),
            custom_components: 0,
            issues: issues.iter().map(ToString::to_string).collect(),
        }
    }
}

impl HumanOutput for ValidationReport {
    fn print_human(&self) {
        if !self.valid {
            println!("Mapping is invalid:");
            for issue in &self.issues {
                println!("  - {issue}");
            }
            return;
        }
        println!("Mapping is valid");
        println!("Types: {}", join_or_none(&self.types));
        println!("Analyzers: {}", join_or_none(&self.analyzers));
        println!("Custom components: {}", self.custom_components);
    }
}

/// Result structure for text analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisResult {
    pub analyzer: String,
    pub tokens: Vec<Token>,
}

impl HumanOutput for AnalysisResult {
    fn print_human(&self) {
        println!("Analyzer: {}", self.analyzer);
        println!("{:>4}  {:<20} {:>6} {:>6}", "pos", "term", "start", "end");
        println!("──────────────────────────────────────────");
        for token in &self.tokens {
            println!(
                "{:>4}  {:<20} {:>6} {:>6}",
                token.position, token.text, token.start_offset, token.end_offset
            );
        }
    }
}

/// Result structure for field resolution.
#[derive(Debug, Serialize)]
pub struct ResolutionResult {
    pub type_name: String,
    pub path: String,
    pub fields: Vec<ResolvedField>,
}

impl HumanOutput for ResolutionResult {
    fn print_human(&self) {
        println!("Type '{}', path '{}':", self.type_name, self.path);
        for field in &self.fields {
            let mut options = Vec::new();
            if field.store {
                options.push("store");
            }
            if !field.index {
                options.push("no-index");
            }
            if field.include_in_all {
                options.push("in-all");
            }
            if field.include_term_vectors {
                options.push("term-vectors");
            }
            if field.dynamic {
                options.push("dynamic");
            }
            println!(
                "  {} ({}) analyzer={} [{}]",
                field.field_name,
                field.field_type.as_str(),
                field.analyzer.as_deref().unwrap_or("-"),
                options.join(", ")
            );
        }
    }
}

/// A document that could not be analyzed.
#[derive(Debug, Serialize)]
pub struct DocumentError {
    pub line: usize,
    pub message: String,
}

/// Result structure for document analysis.
#[derive(Debug, Serialize)]
pub struct IndexingResult {
    pub documents: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub docs_per_second: f64,
    /// Token count per indexed field name, composite field included
    pub field_tokens: BTreeMap<String, usize>,
    pub errors: Vec<DocumentError>,
}

impl HumanOutput for IndexingResult {
    fn print_human(&self) {
        println!(
            "Analyzed {} documents ({} failed) in {}ms ({:.1} docs/s)",
            self.documents, self.failed, self.duration_ms, self.docs_per_second
        );
        if !self.field_tokens.is_empty() {
            println!();
            println!("Tokens per field:");
            for (field, count) in &self.field_tokens {
                println!("  {field}: {count}");
            }
        }
        for error in &self.errors {
            eprintln!("line {}: {}", error.line, error.message);
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "(none)".to_string()
    } else {
        items.join(", ")
    }
}

/// Output a result in the specified format.
pub fn output_result<T: HumanOutput>(result: &T, args: &PaviseArgs) -> Result<()> {
    match args.output_format {
        OutputFormat::Human => {
            if args.verbosity() > 0 {
                result.print_human();
            }
            Ok(())
        }
        OutputFormat::Json => output_json(result, args),
    }
}

/// Output in JSON format.
fn output_json<T: Serialize>(result: &T, args: &PaviseArgs) -> Result<()> {
    let json = if args.pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };

    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigIssue;

    #[test]
    fn test_failed_validation_report() {
        let report = ValidationReport::failed(&[ConfigIssue::new(
            "type 'beer' field 'name'",
            "unknown analyzer",
        )]);
        assert!(!report.valid);
        assert_eq!(report.issues, vec!["type 'beer' field 'name': unknown analyzer"]);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["valid"], false);
    }

    #[test]
    fn test_join_or_none() {
        assert_eq!(join_or_none(&[]), "(none)");
        assert_eq!(join_or_none(&["beer".to_string(), "brewery".to_string()]), "beer, brewery");
    }
}
