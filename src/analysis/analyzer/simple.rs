//! Simple analyzer that performs tokenization without filtering.
//!
//! # Examples
//!
//! ```
//! use pavise::analysis::analyzer::Analyzer;
//! use pavise::analysis::analyzer::simple::SimpleAnalyzer;
//!
//! let analyzer = SimpleAnalyzer::new();
//! let tokens: Vec<_> = analyzer.analyze("Hello World").unwrap().collect();
//!
//! // No filtering applied, original case preserved
//! assert_eq!(tokens.len(), 2);
//! assert_eq!(tokens[0].text, "Hello");
//! assert_eq!(tokens[1].text, "World");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::TokenStream;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::error::Result;

/// An analyzer that just tokenizes without any filtering.
#[derive(Clone)]
pub struct SimpleAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
}

impl SimpleAnalyzer {
    /// Create a simple analyzer over Unicode word boundaries.
    pub fn new() -> Self {
        Self::with_tokenizer(Arc::new(UnicodeWordTokenizer::new()))
    }

    /// Create a simple analyzer with the given tokenizer.
    pub fn with_tokenizer(tokenizer: Arc<dyn Tokenizer>) -> Self {
        SimpleAnalyzer { tokenizer }
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }
}

impl Default for SimpleAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for SimpleAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        self.tokenizer.tokenize(text)
    }

    fn name(&self) -> &str {
        "simple"
    }
}

impl fmt::Debug for SimpleAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleAnalyzer")
            .field("tokenizer", &self.tokenizer.name())
            .finish()
    }
}
