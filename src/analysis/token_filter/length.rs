//! Length filter implementation.

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::{PaviseError, Result};

/// A filter that drops tokens whose character count is outside `[min, max]`.
#[derive(Clone, Debug)]
pub struct LengthFilter {
    min: usize,
    max: Option<usize>,
}

impl LengthFilter {
    /// Create a new length filter. `max` of `None` means unbounded.
    pub fn new(min: usize, max: Option<usize>) -> Result<Self> {
        if let Some(max) = max {
            if max < min {
                return Err(PaviseError::invalid_argument(format!(
                    "length filter max ({max}) is less than min ({min})"
                )));
            }
        }
        Ok(LengthFilter { min, max })
    }

    /// Get the minimum length.
    pub fn min(&self) -> usize {
        self.min
    }

    /// Get the maximum length.
    pub fn max(&self) -> Option<usize> {
        self.max
    }

    fn accepts(&self, text: &str) -> bool {
        let len = text.chars().count();
        len >= self.min && self.max.is_none_or(|max| len <= max)
    }
}

impl Filter for LengthFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .filter(|token| token.is_stopped() || self.accepts(&token.text))
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "length"
    }
}
