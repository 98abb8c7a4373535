//! English possessive filter implementation.

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

const APOSTROPHES: [char; 3] = ['\'', '\u{2019}', '\u{FF07}'];

/// A filter that strips a trailing English possessive (`'s`) from tokens.
///
/// Straight, right single quotation and fullwidth apostrophes are recognized,
/// and the `s` is matched case-insensitively. `"Brewer's"` becomes `"Brewer"`.
#[derive(Clone, Debug, Default)]
pub struct PossessiveFilter;

impl PossessiveFilter {
    /// Create a new possessive filter.
    pub fn new() -> Self {
        PossessiveFilter
    }

    fn strip(text: &str) -> Option<&str> {
        let rest = text
            .strip_suffix('s')
            .or_else(|| text.strip_suffix('S'))?;
        let mut chars = rest.chars();
        match chars.next_back() {
            Some(c) if APOSTROPHES.contains(&c) => Some(chars.as_str()),
            _ => None,
        }
    }
}

impl Filter for PossessiveFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let filtered_tokens: Vec<Token> = tokens
            .map(|token| {
                if token.is_stopped() {
                    return token;
                }
                match Self::strip(&token.text) {
                    Some(stem) => {
                        let stem = stem.to_string();
                        token.with_text(stem)
                    }
                    None => token,
                }
            })
            .collect();

        Ok(Box::new(filtered_tokens.into_iter()))
    }

    fn name(&self) -> &'static str {
        "possessive_en"
    }
}
