//! Tokenizer implementations for text analysis.
//!
//! Tokenizers are the first step after char filtering, responsible for
//! splitting text into initial tokens with positions and byte offsets.
//!
//! # Available Tokenizers
//!
//! - [`unicode_word::UnicodeWordTokenizer`] - Unicode word boundaries (`unicode`)
//! - [`whitespace::WhitespaceTokenizer`] - Splits on whitespace (`whitespace`)
//! - [`regex::RegexTokenizer`] - Custom regex-based tokenization (`regexp`)
//! - [`single::SingleTokenizer`] - The whole value as one token (`single`)
//!
//! # Examples
//!
//! ```
//! use pavise::analysis::tokenizer::Tokenizer;
//! use pavise::analysis::tokenizer::whitespace::WhitespaceTokenizer;
//!
//! let tokenizer = WhitespaceTokenizer::new();
//! let tokens: Vec<_> = tokenizer.tokenize("Hello world").unwrap().collect();
//! assert_eq!(tokens.len(), 2);
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for tokenizers that convert text into tokens.
///
/// The trait requires `Send + Sync` so that compiled analyzers can be shared
/// across indexing threads.
pub trait Tokenizer: Send + Sync {
    /// Tokenize the given text into a stream of tokens.
    fn tokenize(&self, text: &str) -> Result<TokenStream>;

    /// Get the name of this tokenizer (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod regex;
pub mod single;
pub mod unicode_word;
pub mod whitespace;
