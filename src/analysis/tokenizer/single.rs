//! Single-token tokenizer.

use super::Tokenizer;

use crate::analysis::token::{IntoTokenStream, Token, TokenStream};
use crate::error::Result;

/// Emits the whole input as one token at position 0.
///
/// Backs the `keyword` analyzer, and custom analyzers built on the `single`
/// tokenizer can still run token filters over the value, such as `to_lower`
/// for case-insensitive styles. Empty input yields no token.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleTokenizer;

impl SingleTokenizer {
    pub fn new() -> Self {
        SingleTokenizer
    }
}

impl Tokenizer for SingleTokenizer {
    fn tokenize(&self, text: &str) -> Result<TokenStream> {
        let tokens = match text {
            "" => Vec::new(),
            value => vec![Token::with_offsets(value, 0, 0, value.len())],
        };
        Ok(tokens.into_token_stream())
    }

    fn name(&self) -> &'static str {
        "single"
    }
}
