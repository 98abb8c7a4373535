//! Token count limit.

use super::Filter;

use crate::analysis::token::{Token, TokenStream};
use crate::error::Result;

/// Keeps the first `limit` indexed tokens of a value and drops the rest.
///
/// Stopped tokens are not indexed, so they do not count toward the limit and
/// pass through until it is reached. The stream is cut lazily.
#[derive(Clone, Copy, Debug)]
pub struct LimitFilter {
    limit: usize,
}

impl LimitFilter {
    pub fn new(limit: usize) -> Self {
        LimitFilter { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl Filter for LimitFilter {
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream> {
        let mut remaining = self.limit;
        let limited = tokens.map_while(move |token: Token| {
            if remaining == 0 {
                return None;
            }
            if !token.is_stopped() {
                remaining -= 1;
            }
            Some(token)
        });
        Ok(Box::new(limited))
    }

    fn name(&self) -> &'static str {
        "limit"
    }
}
