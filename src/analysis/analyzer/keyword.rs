//! Keyword analyzer that treats the entire input as a single token.

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::simple::SimpleAnalyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::single::SingleTokenizer;
use crate::error::Result;

/// A keyword analyzer that emits the whole value unchanged as one token.
///
/// Useful for identifiers, codes, and category fields such as a beer style.
#[derive(Clone, Debug)]
pub struct KeywordAnalyzer {
    inner: SimpleAnalyzer,
}

impl KeywordAnalyzer {
    /// Create a new keyword analyzer.
    pub fn new() -> Self {
        KeywordAnalyzer {
            inner: SimpleAnalyzer::with_tokenizer(Arc::new(SingleTokenizer::new())),
        }
    }
}

impl Default for KeywordAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for KeywordAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.inner.analyze(text)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}
