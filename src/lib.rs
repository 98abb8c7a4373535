//! # Pavise
//!
//! Text analysis pipelines and index field mappings for full-text search.
//!
//! ## Features
//!
//! - Named component registry for tokenizers, char filters, token filters and analyzers
//! - Custom analyzers composed from registered components
//! - Per-type document mapping trees with analyzer inheritance
//! - Validated, immutable index mappings shared across indexing threads
//! - JSON configuration of the whole mapping

pub mod analysis;
pub mod cli;
pub mod config;
pub mod error;
pub mod mapping;
pub mod registry;

pub mod prelude {
    pub use crate::analysis::analyzer::Analyzer;
    pub use crate::analysis::token::Token;
    pub use crate::error::{PaviseError, Result};
    pub use crate::mapping::document::DocumentMapping;
    pub use crate::mapping::field::FieldMapping;
    pub use crate::mapping::frozen::FrozenIndexMapping;
    pub use crate::mapping::index::IndexMapping;
    pub use crate::registry::{ComponentKind, ComponentRegistry};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
