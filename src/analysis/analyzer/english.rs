//! English analyzer with possessive removal and Porter stemming.
//!
//! # Pipeline
//!
//! 1. UnicodeWordTokenizer
//! 2. PossessiveFilter
//! 3. LowercaseFilter
//! 4. StopFilter (English)
//! 5. StemFilter (Porter)

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::possessive::PossessiveFilter;
use crate::analysis::token_filter::stem::StemFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::Result;

/// Analyzer for English prose, registered as `en`.
#[derive(Clone, Debug)]
pub struct EnglishAnalyzer {
    inner: PipelineAnalyzer,
}

impl EnglishAnalyzer {
    /// Create a new English analyzer.
    pub fn new() -> Self {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_filter(Arc::new(PossessiveFilter::new()))
            .add_filter(Arc::new(LowercaseFilter::new()))
            .add_filter(Arc::new(StopFilter::new()))
            .add_filter(Arc::new(StemFilter::new()))
            .with_name("en");

        EnglishAnalyzer { inner: analyzer }
    }
}

impl Default for EnglishAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for EnglishAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &str {
        "en"
    }
}
