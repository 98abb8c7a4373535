//! Leaf field mappings.
//!
//! A [`FieldMapping`] describes how one value at a document path is indexed.
//! Several field mappings may sit at the same path; each one produces its own
//! indexed field, so a description can be indexed once for search and once
//! more under a different name with a different analyzer.

use serde::{Deserialize, Serialize};

/// The kind of value a field mapping indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Analyzed text
    #[default]
    Text,
    /// Numeric values, indexed as a single term of their `f64` value
    Number,
    /// Boolean values, indexed as `"true"` or `"false"`
    Boolean,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
        }
    }
}

fn default_true() -> bool {
    true
}

/// How a single value is indexed.
///
/// # Examples
///
/// ```
/// use pavise::mapping::field::FieldMapping;
///
/// let lang = FieldMapping::new_text_field_mapping()
///     .with_name("descriptionLang")
///     .with_analyzer("detect_lang")
///     .with_store(false)
///     .with_include_term_vectors(false)
///     .with_include_in_all(false);
///
/// assert_eq!(lang.indexed_name("description"), "descriptionLang");
/// assert_eq!(lang.analyzer.as_deref(), Some("detect_lang"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    /// Indexed field name; `None` uses the last segment of the path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type", default)]
    pub field_type: FieldType,

    /// Analyzer name; `None` inherits from the enclosing document mappings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<String>,

    #[serde(default = "default_true")]
    pub store: bool,

    #[serde(default = "default_true")]
    pub index: bool,

    #[serde(default = "default_true")]
    pub include_in_all: bool,

    #[serde(default = "default_true")]
    pub include_term_vectors: bool,
}

impl FieldMapping {
    /// A text field: stored, indexed, in the composite field, with term vectors.
    pub fn new_text_field_mapping() -> Self {
        FieldMapping {
            name: None,
            field_type: FieldType::Text,
            analyzer: None,
            store: true,
            index: true,
            include_in_all: true,
            include_term_vectors: true,
        }
    }

    /// A numeric field. Numeric fields carry no term vectors.
    pub fn new_number_field_mapping() -> Self {
        FieldMapping {
            field_type: FieldType::Number,
            include_term_vectors: false,
            ..Self::new_text_field_mapping()
        }
    }

    /// A boolean field. Boolean fields carry no term vectors.
    pub fn new_boolean_field_mapping() -> Self {
        FieldMapping {
            field_type: FieldType::Boolean,
            include_term_vectors: false,
            ..Self::new_text_field_mapping()
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.analyzer = Some(analyzer.into());
        self
    }

    pub fn with_store(mut self, store: bool) -> Self {
        self.store = store;
        self
    }

    pub fn with_index(mut self, index: bool) -> Self {
        self.index = index;
        self
    }

    pub fn with_include_in_all(mut self, include_in_all: bool) -> Self {
        self.include_in_all = include_in_all;
        self
    }

    pub fn with_include_term_vectors(mut self, include_term_vectors: bool) -> Self {
        self.include_term_vectors = include_term_vectors;
        self
    }

    /// The name this mapping indexes under when mapped at `path`.
    ///
    /// An explicit name replaces the last path segment, so `descriptionLang`
    /// at `brewery.description` becomes `brewery.descriptionLang`.
    pub fn indexed_name(&self, path: &str) -> String {
        match &self.name {
            None => path.to_string(),
            Some(name) => match path.rsplit_once(super::PATH_SEPARATOR) {
                Some((parent, _)) => format!("{parent}{}{name}", super::PATH_SEPARATOR),
                None => name.clone(),
            },
        }
    }

    pub fn is_text(&self) -> bool {
        self.field_type == FieldType::Text
    }
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self::new_text_field_mapping()
    }
}
