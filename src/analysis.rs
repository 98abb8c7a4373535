//! Text analysis module for Pavise.
//!
//! This module provides the analysis components that index mappings refer to
//! by name: char filters, tokenizers, token filters, and the analyzers that
//! chain them together.
//!
//! ```text
//! Raw Text → Char Filters → Tokenizer → Token Filters → Token Stream
//! ```

pub mod analyzer;
pub mod char_filter;
pub mod token;
pub mod token_filter;
pub mod tokenizer;
