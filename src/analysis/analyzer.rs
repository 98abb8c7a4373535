//! Analyzer implementations that combine tokenizers and filters.
//!
//! An analyzer turns a text value into the token stream that gets indexed.
//! Every analyzer here is immutable once built and safe to share between
//! threads; concurrent calls to [`Analyzer::analyze`] do not interfere.
//!
//! # Available Analyzers
//!
//! - [`pipeline::PipelineAnalyzer`] - Char filters, a tokenizer, and token filters
//! - [`standard::StandardAnalyzer`] - Unicode words, lowercased, English stop words removed
//! - [`simple::SimpleAnalyzer`] - Unicode words, nothing else
//! - [`keyword::KeywordAnalyzer`] - The whole value as one token
//! - [`english::EnglishAnalyzer`] - Standard plus possessive removal and Porter stemming
//! - [`detect_lang::DetectLangAnalyzer`] - The language code of the value as one token

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for analyzers that convert text into processed tokens.
pub trait Analyzer: Send + Sync {
    /// Analyze the given text and return a stream of tokens.
    fn analyze(&self, text: &str) -> Result<TokenStream>;

    /// Get the name this analyzer was registered or defined under.
    fn name(&self) -> &str;
}

pub mod detect_lang;
pub mod english;
pub mod keyword;
pub mod pipeline;
pub mod simple;
pub mod standard;
