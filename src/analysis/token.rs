//! Token types for text analysis.
//!
//! A [`Token`] is the unit that flows through an analysis pipeline. Tokenizers
//! create them, token filters rewrite, drop, or mark them, and the indexer
//! consumes the final stream.
//!
//! Positions are 0-based and monotonically non-decreasing in every stream an
//! analyzer returns. Offsets are byte offsets into the text that was passed to
//! the analyzer (before char filtering).
//!
//! # Examples
//!
//! ```
//! use pavise::analysis::token::Token;
//!
//! let token = Token::with_offsets("world", 1, 6, 11);
//! assert_eq!(token.text, "world");
//! assert_eq!(token.position, 1);
//! assert_eq!(token.start_offset, 6);
//! assert_eq!(token.end_offset, 11);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single analyzed term with its position and source offsets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// The term text
    pub text: String,

    /// The position of the token in the token stream (0-based)
    pub position: usize,

    /// The byte offset where this token starts in the original text
    pub start_offset: usize,

    /// The byte offset where this token ends in the original text
    pub end_offset: usize,

    /// Position increment from the previous token (default: 1).
    ///
    /// 0 places the token at the same position as the previous one.
    #[serde(default = "default_position_increment")]
    pub position_increment: usize,

    /// Whether this token has been marked as stopped by a filter
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub stopped: bool,
}

fn default_position_increment() -> usize {
    1
}

impl Token {
    /// Create a new token with the given text and position.
    pub fn new<S: Into<String>>(text: S, position: usize) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset: 0,
            end_offset: 0,
            position_increment: 1,
            stopped: false,
        }
    }

    /// Create a new token with text, position, and byte offsets.
    pub fn with_offsets<S: Into<String>>(
        text: S,
        position: usize,
        start_offset: usize,
        end_offset: usize,
    ) -> Self {
        Token {
            text: text.into(),
            position,
            start_offset,
            end_offset,
            position_increment: 1,
            stopped: false,
        }
    }

    /// Get the length of the token text in bytes.
    pub fn len(&self) -> usize {
        self.text.len()
    }

    /// Check if the token text is empty.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Mark this token as stopped.
    pub fn stop(mut self) -> Self {
        self.stopped = true;
        self
    }

    /// Check if this token is stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Replace the token text, keeping position and offsets.
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = text.into();
        self
    }

    /// Replace the token position.
    pub fn with_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    /// Set the position increment.
    pub fn with_position_increment(mut self, increment: usize) -> Self {
        self.position_increment = increment;
        self
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// A token stream represents a sequence of tokens from the analysis pipeline.
pub type TokenStream = Box<dyn Iterator<Item = Token>>;

/// Trait for types that can produce a token stream.
pub trait IntoTokenStream {
    /// Convert this type into a token stream.
    fn into_token_stream(self) -> TokenStream;
}

impl IntoTokenStream for Vec<Token> {
    fn into_token_stream(self) -> TokenStream {
        Box::new(self.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let token = Token::new("hello", 0);
        assert_eq!(token.text, "hello");
        assert_eq!(token.position, 0);
        assert_eq!(token.start_offset, 0);
        assert_eq!(token.end_offset, 0);
        assert_eq!(token.position_increment, 1);
        assert!(!token.stopped);
    }

    #[test]
    fn test_token_rewrite_keeps_offsets() {
        let token = Token::with_offsets("Brewery", 3, 10, 17).with_text("brewery");

        assert_eq!(token.text, "brewery");
        assert_eq!(token.position, 3);
        assert_eq!(token.start_offset, 10);
        assert_eq!(token.end_offset, 17);
    }

    #[test]
    fn test_stopped_token_serialization() {
        let json = serde_json::to_value(Token::new("ale", 0)).unwrap();
        assert!(json.get("stopped").is_none());

        let json = serde_json::to_value(Token::new("the", 0).stop()).unwrap();
        assert_eq!(json["stopped"], serde_json::Value::Bool(true));
    }

    #[test]
    fn test_token_stream() {
        let tokens = vec![Token::new("hello", 0), Token::new("world", 1)];

        let collected: Vec<_> = tokens.into_token_stream().collect();

        assert_eq!(collected.len(), 2);
        assert_eq!(collected[0].text, "hello");
        assert_eq!(collected[1].text, "world");
    }
}
