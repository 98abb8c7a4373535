//! HTML tag stripping char filter.

use super::pattern_replace::PatternReplaceCharFilter;
use super::{CharFilter, Transformation};
use crate::error::Result;

/// Matches opening, closing and self-closing tags, with or without attributes.
const HTML_TAG_PATTERN: &str =
    r#"</?[!\w]+((\s+[\w-]+(\s*=\s*(?:".*?"|'.*?'|[^'">\s]+))?)+\s*|\s*)/?>"#;

/// A char filter that replaces HTML tags with a single space.
///
/// The replacement keeps words on either side of a tag apart, so
/// `"<b>pale</b>ale"` tokenizes as `pale`, `ale`.
#[derive(Clone, Debug)]
pub struct HtmlCharFilter {
    inner: PatternReplaceCharFilter,
}

impl HtmlCharFilter {
    /// Create a new HTML char filter.
    pub fn new() -> Result<Self> {
        Ok(HtmlCharFilter {
            inner: PatternReplaceCharFilter::new(HTML_TAG_PATTERN, " ")?,
        })
    }
}

impl CharFilter for HtmlCharFilter {
    fn filter(&self, input: &str) -> (String, Vec<Transformation>) {
        self.inner.filter(input)
    }

    fn name(&self) -> &'static str {
        "html"
    }
}
