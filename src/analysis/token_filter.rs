//! Token filter implementations for token transformation.
//!
//! Filters receive the stream produced by the tokenizer (or by the previous
//! filter) and may rewrite, drop, or mark tokens. In an analyzer they run in
//! the order they were declared, so reordering a chain can change its output.
//!
//! # Available Filters
//!
//! - [`lowercase::LowercaseFilter`] - Converts tokens to lowercase (`to_lower`)
//! - [`truncate::TruncateFilter`] - Cuts tokens to a maximum length (`truncate_token`)
//! - [`possessive::PossessiveFilter`] - Removes English possessive `'s` (`possessive_en`)
//! - [`stop::StopFilter`] - Removes stop words (`stop_en`, `stop_tokens`)
//! - [`stem::StemFilter`] - Reduces words to their stem (`stemmer_porter`)
//! - [`length::LengthFilter`] - Drops tokens outside a length range (`length`)
//! - [`limit::LimitFilter`] - Keeps the first indexed tokens of a value (`limit`)
//!
//! # Examples
//!
//! ```
//! use pavise::analysis::token_filter::Filter;
//! use pavise::analysis::token_filter::lowercase::LowercaseFilter;
//! use pavise::analysis::token::Token;
//!
//! let filter = LowercaseFilter::new();
//! let tokens = vec![Token::new("Hello", 0), Token::new("WORLD", 1)];
//! let filtered: Vec<_> = filter.filter(Box::new(tokens.into_iter()))
//!     .unwrap()
//!     .collect();
//!
//! assert_eq!(filtered[0].text, "hello");
//! assert_eq!(filtered[1].text, "world");
//! ```

use crate::analysis::token::TokenStream;
use crate::error::Result;

/// Trait for filters that transform token streams.
///
/// Implementations must keep token positions non-decreasing.
pub trait Filter: Send + Sync {
    /// Apply this filter to a token stream.
    fn filter(&self, tokens: TokenStream) -> Result<TokenStream>;

    /// Get the name of this filter (for debugging and configuration).
    fn name(&self) -> &'static str;
}

pub mod length;
pub mod limit;
pub mod lowercase;
pub mod possessive;
pub mod stem;
pub mod stop;
pub mod truncate;
