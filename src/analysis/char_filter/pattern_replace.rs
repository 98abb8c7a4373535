//! Regex replacement char filter.

use regex::Regex;

use super::{CharFilter, Transformation};
use crate::error::{PaviseError, Result};

/// A char filter that replaces every match of a regex with a fixed string.
#[derive(Clone, Debug)]
pub struct PatternReplaceCharFilter {
    pattern: Regex,
    replacement: String,
}

impl PatternReplaceCharFilter {
    /// Create a new pattern replace char filter.
    pub fn new(pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .map_err(|e| PaviseError::analysis(format!("Invalid regex pattern: {e}")))?;
        Ok(Self {
            pattern,
            replacement: replacement.to_string(),
        })
    }

    /// Get the regex pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Get the replacement string.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }
}

impl CharFilter for PatternReplaceCharFilter {
    fn filter(&self, input: &str) -> (String, Vec<Transformation>) {
        let mut output = String::with_capacity(input.len());
        let mut transformations = Vec::new();
        let mut last_match_end = 0;

        for m in self.pattern.find_iter(input) {
            output.push_str(&input[last_match_end..m.start()]);

            let replacement_start = output.len();
            output.push_str(&self.replacement);
            let replacement_end = output.len();

            // Same-length replacements need no offset correction.
            if m.end() - m.start() != replacement_end - replacement_start {
                transformations.push(Transformation::new(
                    m.start(),
                    m.end(),
                    replacement_start,
                    replacement_end,
                ));
            }

            last_match_end = m.end();
        }

        output.push_str(&input[last_match_end..]);

        (output, transformations)
    }

    fn name(&self) -> &'static str {
        "regexp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_replace() {
        let filter = PatternReplaceCharFilter::new(r"(\d+)", "NUM").unwrap();
        let (output, transformations) = filter.filter("Year 2024");

        assert_eq!(output, "Year NUM");
        assert_eq!(transformations.len(), 1);
        assert_eq!(transformations[0], Transformation::new(5, 9, 5, 8));
    }

    #[test]
    fn test_remove_pattern() {
        let filter = PatternReplaceCharFilter::new(r"-", "").unwrap();
        let (output, transformations) = filter.filter("123-456-789");

        assert_eq!(output, "123456789");
        assert_eq!(transformations.len(), 2);
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(PatternReplaceCharFilter::new(r"(unclosed", "").is_err());
    }
}
