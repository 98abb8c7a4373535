//! Command implementations for the Pavise CLI.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::time::Instant;

use log::{debug, info};
use rayon::prelude::*;
use serde_json::Value;

use crate::cli::args::*;
use crate::cli::output::*;
use crate::error::{PaviseError, Result};
use crate::mapping::frozen::{AnalyzedDocument, FrozenIndexMapping};
use crate::mapping::index::IndexMapping;

/// Execute a CLI command.
pub fn execute_command(args: PaviseArgs) -> Result<()> {
    match &args.command {
        Command::Validate(validate_args) => validate_mapping(validate_args, &args),
        Command::Analyze(analyze_args) => analyze_text(analyze_args, &args),
        Command::Resolve(resolve_args) => resolve_field(resolve_args, &args),
        Command::Index(index_args) => index_documents(index_args, &args),
    }
}

fn load_frozen(path: &Path) -> Result<FrozenIndexMapping> {
    info!("loading mapping from {}", path.display());
    IndexMapping::from_file(path)?.freeze()
}

/// Freeze a mapping and report what it contains.
fn validate_mapping(args: &ValidateArgs, cli_args: &PaviseArgs) -> Result<()> {
    let mapping = IndexMapping::from_file(&args.mapping)?;
    match mapping.freeze() {
        Ok(frozen) => output_result(
            &ValidationReport {
                valid: true,
                types: frozen.mapping().type_names().map(str::to_string).collect(),
                analyzers: frozen
                    .analyzer_names()
                    .into_iter()
                    .map(str::to_string)
                    .collect(),
                custom_components: frozen.mapping().custom_analysis().len(),
                issues: Vec::new(),
            },
            cli_args,
        ),
        Err(e) => {
            if let Some(issues) = e.config_issues() {
                output_result(&ValidationReport::failed(issues), cli_args)?;
            }
            Err(e)
        }
    }
}

/// Run an analyzer over the given text.
fn analyze_text(args: &AnalyzeArgs, cli_args: &PaviseArgs) -> Result<()> {
    let frozen = load_frozen(&args.mapping)?;
    let analyzer = args
        .analyzer
        .clone()
        .unwrap_or_else(|| frozen.mapping().default_analyzer.clone());
    let tokens = frozen.analyze_text(&analyzer, &args.text)?;
    output_result(&AnalysisResult { analyzer, tokens }, cli_args)
}

/// Show the resolved field mappings for a path.
fn resolve_field(args: &ResolveArgs, cli_args: &PaviseArgs) -> Result<()> {
    let frozen = load_frozen(&args.mapping)?;
    let fields = frozen.resolve_field(&args.type_name, &args.field)?;
    output_result(
        &ResolutionResult {
            type_name: args.type_name.clone(),
            path: args.field.clone(),
            fields,
        },
        cli_args,
    )
}

/// Analyze every document of a JSON lines file in parallel.
fn index_documents(args: &IndexArgs, cli_args: &PaviseArgs) -> Result<()> {
    let frozen = load_frozen(&args.mapping)?;

    let reader = BufReader::new(File::open(&args.documents)?);
    let mut lines = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        if !line.trim().is_empty() {
            lines.push((line_num + 1, line));
        }
    }
    debug!("read {} documents from {}", lines.len(), args.documents.display());

    let pool = {
        let mut builder = rayon::ThreadPoolBuilder::new();
        if let Some(threads) = args.threads {
            builder = builder.num_threads(threads);
        }
        builder
            .build()
            .map_err(|e| PaviseError::other(format!("cannot start worker pool: {e}")))?
    };

    let start_time = Instant::now();
    let outcomes: Vec<(usize, Result<AnalyzedDocument>)> = pool.install(|| {
        lines
            .par_iter()
            .map(|(line_num, line)| (*line_num, analyze_line(&frozen, line)))
            .collect()
    });
    let duration = start_time.elapsed();

    let mut field_tokens: BTreeMap<String, usize> = BTreeMap::new();
    let mut errors = Vec::new();
    let mut documents = 0;
    for (line, outcome) in outcomes {
        match outcome {
            Ok(doc) => {
                documents += 1;
                for field in &doc.fields {
                    *field_tokens.entry(field.name.clone()).or_default() += field.tokens.len();
                }
                if let Some(composite) = &doc.composite {
                    *field_tokens.entry(composite.name.clone()).or_default() +=
                        composite.tokens.len();
                }
            }
            Err(e) => errors.push(DocumentError {
                line,
                message: e.to_string(),
            }),
        }
    }

    let seconds = duration.as_secs_f64();
    output_result(
        &IndexingResult {
            documents,
            failed: errors.len(),
            duration_ms: duration.as_millis() as u64,
            docs_per_second: if seconds > 0.0 {
                documents as f64 / seconds
            } else {
                0.0
            },
            field_tokens,
            errors,
        },
        cli_args,
    )
}

fn analyze_line(frozen: &FrozenIndexMapping, line: &str) -> Result<AnalyzedDocument> {
    let document: Value = serde_json::from_str(line)?;
    frozen.analyze_document(&document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn mapping_file() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"type_field": "type", "default_analyzer": "en",
                "types": {{"beer": {{"properties": {{"style": {{"fields": [{{"analyzer": "keyword"}}]}}}}}}}}}}"#
        )
        .unwrap();
        file
    }

    fn quiet_args(command: Command) -> PaviseArgs {
        PaviseArgs {
            verbose: 0,
            quiet: true,
            output_format: OutputFormat::Human,
            pretty: false,
            command,
        }
    }

    #[test]
    fn test_analyze_line() {
        let file = mapping_file();
        let frozen = load_frozen(file.path()).unwrap();

        let doc = analyze_line(&frozen, r#"{"type": "beer", "style": "Pale Ale"}"#).unwrap();
        assert_eq!(doc.type_name, "beer");
        assert!(analyze_line(&frozen, "not json").is_err());
    }

    #[test]
    fn test_index_documents_counts_failures() {
        let mapping = mapping_file();
        let mut docs = NamedTempFile::new().unwrap();
        writeln!(docs, r#"{{"type": "beer", "style": "Pale Ale"}}"#).unwrap();
        writeln!(docs).unwrap();
        writeln!(docs, "[1, 2]").unwrap();

        let args = IndexArgs {
            mapping: mapping.path().to_path_buf(),
            documents: docs.path().to_path_buf(),
            threads: Some(2),
        };
        let cli_args = quiet_args(Command::Index(args.clone()));
        assert!(index_documents(&args, &cli_args).is_ok());
    }

    #[test]
    fn test_validate_reports_configuration_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"default_analyzer": "missing"}}"#).unwrap();

        let args = ValidateArgs {
            mapping: file.path().to_path_buf(),
        };
        let cli_args = quiet_args(Command::Validate(args.clone()));
        let err = validate_mapping(&args, &cli_args).unwrap_err();
        assert!(matches!(err, PaviseError::Configuration(_)));
    }
}
