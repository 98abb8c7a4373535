//! Command line argument parsing for the Pavise CLI using clap.

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Pavise - text analysis and index mapping toolkit
#[derive(Parser, Debug, Clone)]
#[command(name = "pavise")]
#[command(about = "Validate index mappings and run their analyzers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "Pavise Contributors")]
#[command(long_about = None)]
pub struct PaviseArgs {
    /// Verbosity level (0=quiet, 1=normal, 2=verbose, 3=debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (overrides verbose)
    #[arg(short, long)]
    pub quiet: bool,

    /// Output format
    #[arg(short = 'f', long = "format", default_value = "human")]
    pub output_format: OutputFormat,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl PaviseArgs {
    /// Get the effective verbosity level
    pub fn verbosity(&self) -> u8 {
        if self.quiet {
            0
        } else {
            match self.verbose {
                0 => 1, // Default to normal
                n => n,
            }
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Freeze a mapping and report its types and analyzers
    Validate(ValidateArgs),

    /// Run one analyzer of a mapping over a text
    Analyze(AnalyzeArgs),

    /// Show how a field path of a type is indexed
    Resolve(ResolveArgs),

    /// Analyze a file of JSON documents, one per line
    Index(IndexArgs),
}

/// Arguments for validating a mapping
#[derive(Parser, Debug, Clone)]
pub struct ValidateArgs {
    /// Index mapping file (JSON)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,
}

/// Arguments for analyzing text
#[derive(Parser, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Index mapping file (JSON)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Analyzer name (default: the mapping's default analyzer)
    #[arg(short, long)]
    pub analyzer: Option<String>,

    /// Text to analyze
    #[arg(value_name = "TEXT")]
    pub text: String,
}

/// Arguments for resolving a field
#[derive(Parser, Debug, Clone)]
pub struct ResolveArgs {
    /// Index mapping file (JSON)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Document type
    #[arg(short = 't', long = "type", value_name = "TYPE")]
    pub type_name: String,

    /// Dotted field path
    #[arg(long, value_name = "PATH")]
    pub field: String,
}

/// Arguments for analyzing a document file
#[derive(Parser, Debug, Clone)]
pub struct IndexArgs {
    /// Index mapping file (JSON)
    #[arg(value_name = "MAPPING")]
    pub mapping: PathBuf,

    /// Document file (JSON lines)
    #[arg(value_name = "DOCUMENTS")]
    pub documents: PathBuf,

    /// Number of worker threads (default: number of CPUs)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,
}

/// Output formats for CLI
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output
    Json,
}
