//! Truncate filter implementation.

use super::Filter;
use crate::analysis::token::TokenStream;
use crate::error::{PaviseError, Result};

/// A filter that cuts every token to at most `length` characters.
///
/// Length is counted in Unicode scalar values, not bytes, so a token is never
/// split inside a character.
#[derive(Clone, Debug)]
pub struct TruncateFilter {
    length: usize,
}

impl TruncateFilter {
    /// Create a new truncate filter. The length must be at least 1.
    pub fn new(length: usize) -> Result<Self> {
        if length == 0 {
            return Err(PaviseError::invalid_argument(
                "truncate length must be greater than zero",
            ));
        }
        Ok(TruncateFilter { length })
    }

    /// Get the maximum token length.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Filter for TruncateFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let length = self.length;
        let filtered_tokens = tokens
            .map(|token| match token.text.char_indices().nth(length) {
                Some((cut, _)) if !token.is_stopped() => {
                    let truncated = token.text[..cut].to_string();
                    token.with_text(truncated)
                }
                _ => token,
            })
            .collect::<Vec<_>>();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "truncate_token"
    }
}
