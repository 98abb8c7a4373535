//! Char filter implementations for text normalization.
//!
//! Char filters pre-process the raw text before it reaches the tokenizer. Each
//! filter reports the [`Transformation`]s it applied so that token offsets can
//! be mapped back onto the original text.
//!
//! # Available Filters
//!
//! - [`pattern_replace::PatternReplaceCharFilter`] - Regex-based replacement (`regexp`)
//! - [`html::HtmlCharFilter`] - Replaces HTML tags with whitespace (`html`)

/// Represents a change in the text, mapping a range in the original text
/// to a range in the new text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transformation {
    pub original_start: usize,
    pub original_end: usize,
    pub new_start: usize,
    pub new_end: usize,
}

impl Transformation {
    pub fn new(
        original_start: usize,
        original_end: usize,
        new_start: usize,
        new_end: usize,
    ) -> Self {
        Self {
            original_start,
            original_end,
            new_start,
            new_end,
        }
    }
}

/// Trait for character filters that transform text before tokenization.
pub trait CharFilter: Send + Sync {
    /// Apply this filter to the input text.
    ///
    /// Returns the filtered text and the transformations that changed the
    /// length of a span, ordered by position.
    fn filter(&self, input: &str) -> (String, Vec<Transformation>);

    /// Get the name of this char filter.
    fn name(&self) -> &'static str;
}

/// Map an offset in filtered text back to the text the filter received.
///
/// Offsets past a transformation are shifted by its length difference. Offsets
/// inside a replaced span are interpolated linearly into the original span.
pub fn correct_offset(offset: usize, transformations: &[Transformation]) -> usize {
    let mut shift: isize = 0;
    for t in transformations {
        let original_len = (t.original_end - t.original_start) as isize;
        let new_len = (t.new_end - t.new_start) as isize;

        if offset >= t.new_end {
            shift += original_len - new_len;
        } else if offset >= t.new_start {
            let offset_in_new = (offset - t.new_start) as isize;
            return t.original_start + (offset_in_new * original_len / new_len.max(1)) as usize;
        } else {
            break;
        }
    }
    (offset as isize + shift) as usize
}

pub mod html;
pub mod pattern_replace;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_correct_offset_after_removal() {
        // "foo-bar" -> "foobar", '-' removed at original 3..4
        let transformations = vec![Transformation::new(3, 4, 3, 3)];

        assert_eq!(correct_offset(0, &transformations), 0);
        assert_eq!(correct_offset(3, &transformations), 4);
        assert_eq!(correct_offset(6, &transformations), 7);
    }

    #[test]
    fn test_correct_offset_inside_expansion() {
        // one 3-byte char expanded to 12 bytes
        let transformations = vec![Transformation::new(0, 3, 0, 12)];

        assert_eq!(correct_offset(0, &transformations), 0);
        assert_eq!(correct_offset(12, &transformations), 3);
    }
}
