//! Language detection analyzer.

use whatlang::detect;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::{IntoTokenStream, Token, TokenStream};
use crate::error::Result;

/// Code emitted when no language can be detected.
pub const UNDETERMINED: &str = "und";

/// An analyzer that replaces the whole value with one token: the ISO 639-3
/// code of its language, such as `eng` or `deu`.
///
/// The token spans the whole input, so a description can be indexed a second
/// time as its language next to its analyzed text.
#[derive(Clone, Debug, Default)]
pub struct DetectLangAnalyzer;

impl DetectLangAnalyzer {
    pub fn new() -> Self {
        DetectLangAnalyzer
    }

    /// The language code for `text`, or [`UNDETERMINED`].
    pub fn detect(&self, text: &str) -> &'static str {
        detect(text).map_or(UNDETERMINED, |info| info.lang().code())
    }
}

impl Analyzer for DetectLangAnalyzer {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        if text.trim().is_empty() {
            return Ok(Vec::<Token>::new().into_token_stream());
        }
        let token = Token::with_offsets(self.detect(text), 0, 0, text.len());
        Ok(vec![token].into_token_stream())
    }

    fn name(&self) -> &str {
        "detect_lang"
    }
}
