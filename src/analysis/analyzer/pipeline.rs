//! Pipeline analyzer that combines tokenizers and filters.
//!
//! This is the building block behind every analyzer in the crate, including
//! the custom analyzers declared in an index mapping.
//!
//! # Architecture
//!
//! The PipelineAnalyzer applies processing in this order:
//! 1. Char Filters: Rewrite raw text, in declaration order
//! 2. Tokenizer: Splits text into tokens
//! 3. Token Filters: Applied sequentially in the order they were added
//!
//! # Examples
//!
//! ```
//! use pavise::analysis::analyzer::Analyzer;
//! use pavise::analysis::analyzer::pipeline::PipelineAnalyzer;
//! use pavise::analysis::tokenizer::regex::RegexTokenizer;
//! use pavise::analysis::token_filter::lowercase::LowercaseFilter;
//! use pavise::analysis::token_filter::stop::StopFilter;
//! use std::sync::Arc;
//!
//! let tokenizer = Arc::new(RegexTokenizer::new().unwrap());
//! let analyzer = PipelineAnalyzer::new(tokenizer)
//!     .add_filter(Arc::new(LowercaseFilter::new()))
//!     .add_filter(Arc::new(StopFilter::from_words(vec!["the", "and"])))
//!     .with_name("my_custom_analyzer");
//!
//! let tokens: Vec<_> = analyzer.analyze("Hello THE world AND test").unwrap().collect();
//!
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[0].text, "hello");
//! assert_eq!(tokens[1].text, "world");
//! assert_eq!(tokens[2].text, "test");
//! ```

use std::fmt;
use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::{self, CharFilter};
use crate::analysis::token::{IntoTokenStream, TokenStream};
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::Result;

/// A configurable analyzer that combines a tokenizer with a chain of filters.
#[derive(Clone)]
pub struct PipelineAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    char_filters: Vec<Arc<dyn CharFilter>>,
    filters: Vec<Arc<dyn Filter>>,
    name: String,
}

impl PipelineAnalyzer {
    /// Create a new pipeline analyzer with the given tokenizer.
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        PipelineAnalyzer {
            name: format!("pipeline_{}", tokenizer.name()),
            tokenizer,
            char_filters: Vec::new(),
            filters: Vec::new(),
        }
    }

    /// Add a char filter to the pipeline.
    pub fn add_char_filter(mut self, char_filter: Arc<dyn CharFilter>) -> Self {
        self.char_filters.push(char_filter);
        self
    }

    /// Add a filter to the pipeline.
    pub fn add_filter(mut self, filter: Arc<dyn Filter>) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set a custom name for this analyzer.
    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Get the tokenizer used by this analyzer.
    pub fn tokenizer(&self) -> &Arc<dyn Tokenizer> {
        &self.tokenizer
    }

    /// Get the char filters used by this analyzer.
    pub fn char_filters(&self) -> &[Arc<dyn CharFilter>] {
        &self.char_filters
    }

    /// Get the filters used by this analyzer.
    pub fn filters(&self) -> &[Arc<dyn Filter>] {
        &self.filters
    }
}

impl Analyzer for PipelineAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let mut filtered_text = text.to_string();
        let mut filter_transformations = Vec::with_capacity(self.char_filters.len());

        for char_filter in &self.char_filters {
            let (new_text, transformations) = char_filter.filter(&filtered_text);
            filtered_text = new_text;
            filter_transformations.push(transformations);
        }

        let mut tokens = self.tokenizer.tokenize(&filtered_text)?;

        for filter in &self.filters {
            tokens = filter.filter(tokens)?;
        }

        if filter_transformations.iter().all(Vec::is_empty) {
            return Ok(tokens);
        }

        // Map from the last char filter's output back to the original text.
        let collected = tokens
            .map(|mut token| {
                for transformations in filter_transformations.iter().rev() {
                    token.start_offset =
                        char_filter::correct_offset(token.start_offset, transformations);
                    token.end_offset =
                        char_filter::correct_offset(token.end_offset, transformations);
                }
                token
            })
            .collect::<Vec<_>>();
        Ok(collected.into_token_stream())
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for PipelineAnalyzer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineAnalyzer")
            .field("name", &self.name)
            .field("tokenizer", &self.tokenizer.name())
            .field(
                "char_filters",
                &self
                    .char_filters
                    .iter()
                    .map(|f| f.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "filters",
                &self.filters.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::char_filter::html::HtmlCharFilter;
    use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
    use crate::analysis::token::Token;
    use crate::analysis::token_filter::lowercase::LowercaseFilter;
    use crate::analysis::token_filter::stop::StopFilter;
    use crate::analysis::token_filter::truncate::TruncateFilter;
    use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
    use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;

    fn texts(analyzer: &PipelineAnalyzer, text: &str) -> Vec<String> {
        analyzer.analyze(text).unwrap().map(|t| t.text).collect()
    }

    #[test]
    fn test_pipeline_with_pattern_replace() {
        let tokenizer = Arc::new(WhitespaceTokenizer::new());
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(r"-", "").unwrap()));

        let tokens: Vec<Token> = analyzer.analyze("123-456 789").unwrap().collect();

        assert_eq!(tokens.len(), 2);
        assert_eq!(tokens[0].text, "123456");
        assert_eq!(tokens[1].text, "789");
    }

    #[test]
    fn test_offset_correction_pattern_replace() {
        let tokenizer = Arc::new(WhitespaceTokenizer::new());
        let analyzer = PipelineAnalyzer::new(tokenizer)
            .add_char_filter(Arc::new(PatternReplaceCharFilter::new(r"-", "").unwrap()));

        // "foo-bar" (7 bytes) -> "foobar" (6 bytes)
        let tokens: Vec<Token> = analyzer.analyze("foo-bar").unwrap().collect();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "foobar");
        assert_eq!(tokens[0].start_offset, 0);
        assert_eq!(tokens[0].end_offset, 7);
    }

    #[test]
    fn test_html_then_tokenize() {
        let analyzer = PipelineAnalyzer::new(Arc::new(UnicodeWordTokenizer::new()))
            .add_char_filter(Arc::new(HtmlCharFilter::new().unwrap()))
            .add_filter(Arc::new(LowercaseFilter::new()));

        assert_eq!(texts(&analyzer, "<b>Hoppy</b> Ale"), vec!["hoppy", "ale"]);
    }

    #[test]
    fn test_token_filter_order_matters() {
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(UnicodeWordTokenizer::new());
        let truncate: Arc<dyn Filter> = Arc::new(TruncateFilter::new(5).unwrap());
        let stop: Arc<dyn Filter> = Arc::new(StopFilter::new());

        let truncate_then_stop = PipelineAnalyzer::new(tokenizer.clone())
            .add_filter(truncate.clone())
            .add_filter(stop.clone());
        let stop_then_truncate = PipelineAnalyzer::new(tokenizer)
            .add_filter(stop)
            .add_filter(truncate);

        // "therefore" truncates to the stop word "there"
        assert!(texts(&truncate_then_stop, "therefore").is_empty());
        assert_eq!(texts(&stop_then_truncate, "therefore"), vec!["there"]);
    }

    #[test]
    fn test_lowercase_truncate_order() {
        let tokenizer: Arc<dyn Tokenizer> = Arc::new(WhitespaceTokenizer::new());
        let truncate: Arc<dyn Filter> = Arc::new(TruncateFilter::new(1).unwrap());
        let lower: Arc<dyn Filter> = Arc::new(LowercaseFilter::new());

        let truncate_first = PipelineAnalyzer::new(tokenizer.clone())
            .add_filter(truncate.clone())
            .add_filter(lower.clone());
        let lower_first = PipelineAnalyzer::new(tokenizer)
            .add_filter(lower)
            .add_filter(truncate);

        assert_eq!(texts(&truncate_first, "İzmir"), vec!["i\u{307}"]);
        assert_eq!(texts(&lower_first, "İzmir"), vec!["i"]);
    }

    #[test]
    fn test_pipeline_name_and_debug() {
        let analyzer = PipelineAnalyzer::new(Arc::new(WhitespaceTokenizer::new()))
            .add_filter(Arc::new(LowercaseFilter::new()));
        assert_eq!(analyzer.name(), "pipeline_whitespace");

        let analyzer = analyzer.with_name("enNotTooLong");
        assert_eq!(analyzer.name(), "enNotTooLong");
        assert!(format!("{analyzer:?}").contains("to_lower"));
    }
}
