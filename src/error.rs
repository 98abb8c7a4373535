//! Error types for the Pavise library.
//!
//! All errors are represented by the [`PaviseError`] enum. Configuration
//! problems are detected when components are registered, when analyzers are
//! built, or when an index mapping is frozen, so document analysis never meets
//! an unresolved analyzer reference.
//!
//! # Examples
//!
//! ```
//! use pavise::error::{PaviseError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(PaviseError::invalid_argument("Invalid input"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::fmt;
use std::io;

use thiserror::Error;

use crate::registry::ComponentKind;

/// The main error type for Pavise operations.
#[derive(Error, Debug)]
pub enum PaviseError {
    /// I/O errors (reading mapping files, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A name was registered twice for the same kind.
    #[error("Duplicate {kind} name: '{name}'")]
    DuplicateName { kind: String, name: String },

    /// A name was looked up in the component registry but never registered.
    #[error("Unknown {kind}: '{name}'")]
    UnknownComponent { kind: ComponentKind, name: String },

    /// A component referenced while building an analyzer could not be resolved.
    #[error("Unresolved {kind} '{name}' referenced by {referenced_by}")]
    UnresolvedComponent {
        kind: ComponentKind,
        name: String,
        referenced_by: String,
    },

    /// Validation failures collected while freezing an index mapping.
    #[error("Configuration error: {0}")]
    Configuration(ConfigIssues),

    /// No analyzer could be selected for a field.
    #[error("No applicable mapping for field '{path}' of type '{type_name}'")]
    NoApplicableMapping { type_name: String, path: String },

    /// Analysis-related errors (tokenization, filtering, etc.)
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with PaviseError.
pub type Result<T> = std::result::Result<T, PaviseError>;

/// A single problem found while validating a configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConfigIssue {
    /// What the problem is attached to, e.g. `type 'beer' field 'name'`.
    pub subject: String,
    /// Description of the problem.
    pub message: String,
}

impl ConfigIssue {
    pub fn new<S: Into<String>, M: Into<String>>(subject: S, message: M) -> Self {
        ConfigIssue {
            subject: subject.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// The issues reported by a failed freeze, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfigIssues(pub Vec<ConfigIssue>);

impl ConfigIssues {
    pub fn issues(&self) -> &[ConfigIssue] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ConfigIssues {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, issue) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl PaviseError {
    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        PaviseError::Analysis(msg.into())
    }

    /// Create a new duplicate name error.
    pub fn duplicate_name<K: fmt::Display, S: Into<String>>(kind: K, name: S) -> Self {
        PaviseError::DuplicateName {
            kind: kind.to_string(),
            name: name.into(),
        }
    }

    /// Create a new unknown component error.
    pub fn unknown_component<S: Into<String>>(kind: ComponentKind, name: S) -> Self {
        PaviseError::UnknownComponent {
            kind,
            name: name.into(),
        }
    }

    /// Create a new unresolved component error.
    pub fn unresolved_component<S: Into<String>, R: Into<String>>(
        kind: ComponentKind,
        name: S,
        referenced_by: R,
    ) -> Self {
        PaviseError::UnresolvedComponent {
            kind,
            name: name.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create a new configuration error from collected issues.
    pub fn configuration(issues: Vec<ConfigIssue>) -> Self {
        PaviseError::Configuration(ConfigIssues(issues))
    }

    /// Create a new no applicable mapping error.
    pub fn no_applicable_mapping<T: Into<String>, P: Into<String>>(type_name: T, path: P) -> Self {
        PaviseError::NoApplicableMapping {
            type_name: type_name.into(),
            path: path.into(),
        }
    }

    /// Create a new invalid operation error.
    pub fn invalid_operation<S: Into<String>>(msg: S) -> Self {
        PaviseError::InvalidOperation(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        PaviseError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        PaviseError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        PaviseError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// The collected issues if this is a configuration error.
    pub fn config_issues(&self) -> Option<&[ConfigIssue]> {
        match self {
            PaviseError::Configuration(issues) => Some(issues.issues()),
            _ => None,
        }
    }
}
