//! The index-wide mapping.
//!
//! An [`IndexMapping`] owns the document mapping of every type, the custom
//! analysis components and the component registry they are built from. It is
//! assembled mutably and then validated by [`IndexMapping::freeze`], which
//! either reports every configuration problem at once or returns an immutable
//! [`FrozenIndexMapping`].
//!
//! # Examples
//!
//! ```
//! use pavise::mapping::document::DocumentMapping;
//! use pavise::mapping::field::FieldMapping;
//! use pavise::mapping::index::IndexMapping;
//! use serde_json::json;
//!
//! let mut mapping = IndexMapping::new();
//! mapping
//!     .add_custom_token_filter("notTooLong", json!({"type": "truncate_token", "length": 5}))
//!     .unwrap();
//!
//! let mut beer = DocumentMapping::new();
//! beer.add_field_mappings_at(
//!     "name",
//!     [FieldMapping::new_text_field_mapping().with_analyzer("en")],
//! ).unwrap();
//! mapping.add_document_mapping("beer", beer);
//!
//! let frozen = mapping.freeze().unwrap();
//! assert_eq!(frozen.resolve_analyzer("beer", "name").unwrap(), vec!["en"]);
//! ```

use std::collections::BTreeMap;

use log::info;
use serde_json::Value;

use crate::error::{ConfigIssue, PaviseError, Result};
use crate::mapping::document::DocumentMapping;
use crate::mapping::frozen::FrozenIndexMapping;
use crate::mapping::validate_field_name;
use crate::registry::{AnalysisCache, ComponentKind, ComponentParams, ComponentRegistry};

pub use crate::registry::CustomAnalysis;

/// Default name of the document field holding the type name.
pub const DEFAULT_TYPE_FIELD: &str = "_type";
/// Default type for documents without a type field.
pub const DEFAULT_TYPE: &str = "_default";
/// Analyzer used when nothing more specific is configured.
pub const DEFAULT_ANALYZER: &str = "standard";
/// Default name of the composite field.
pub const DEFAULT_FIELD: &str = "_all";

/// Mapping for a whole index.
#[derive(Clone, Debug)]
pub struct IndexMapping {
    type_mapping: BTreeMap<String, DocumentMapping>,

    /// Mapping for documents whose type has no mapping of its own
    pub default_mapping: DocumentMapping,

    /// Document field holding the type name; may be a dotted path
    pub type_field: String,

    /// Type assumed when a document has no type field
    pub default_type: String,

    /// Analyzer applied when no document mapping sets a default
    pub default_analyzer: String,

    /// Name of the composite field; empty disables it
    pub default_field: String,

    /// Whether dynamically mapped fields are indexed
    pub index_dynamic: bool,

    /// Whether dynamically mapped fields are stored
    pub store_dynamic: bool,

    custom_analysis: CustomAnalysis,
    registry: ComponentRegistry,
}

impl IndexMapping {
    /// Create a mapping backed by a registry of the built-in components.
    pub fn new() -> Self {
        Self::with_registry(ComponentRegistry::new())
    }

    /// Create a mapping backed by `registry`.
    pub fn with_registry(registry: ComponentRegistry) -> Self {
        IndexMapping {
            type_mapping: BTreeMap::new(),
            default_mapping: DocumentMapping::new(),
            type_field: DEFAULT_TYPE_FIELD.to_string(),
            default_type: DEFAULT_TYPE.to_string(),
            default_analyzer: DEFAULT_ANALYZER.to_string(),
            default_field: DEFAULT_FIELD.to_string(),
            index_dynamic: true,
            store_dynamic: true,
            custom_analysis: CustomAnalysis::new(),
            registry,
        }
    }

    pub fn with_type_field<S: Into<String>>(mut self, type_field: S) -> Self {
        self.type_field = type_field.into();
        self
    }

    pub fn with_default_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.default_analyzer = analyzer.into();
        self
    }

    /// Attach the document mapping for `type_name`, replacing any previous one.
    pub fn add_document_mapping<S: Into<String>>(&mut self, type_name: S, mapping: DocumentMapping) {
        self.type_mapping.insert(type_name.into(), mapping);
    }

    /// The document mapping registered for `type_name`, if any.
    pub fn document_mapping(&self, type_name: &str) -> Option<&DocumentMapping> {
        self.type_mapping.get(type_name)
    }

    /// The document mapping that applies to `type_name`.
    ///
    /// Types without their own mapping use the default mapping.
    pub fn mapping_for_type(&self, type_name: &str) -> &DocumentMapping {
        self.type_mapping
            .get(type_name)
            .unwrap_or(&self.default_mapping)
    }

    /// Mapped type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.type_mapping.keys().map(String::as_str)
    }

    pub fn type_mappings(&self) -> &BTreeMap<String, DocumentMapping> {
        &self.type_mapping
    }

    /// Declare a custom component of any kind.
    pub fn add_custom<S: Into<String>>(
        &mut self,
        kind: ComponentKind,
        name: S,
        params: ComponentParams,
    ) -> Result<()> {
        self.custom_analysis.add(kind, name, params)
    }

    pub fn add_custom_analyzer<S: Into<String>>(&mut self, name: S, params: Value) -> Result<()> {
        self.add_custom(ComponentKind::Analyzer, name, ComponentParams::try_from(params)?)
    }

    pub fn add_custom_tokenizer<S: Into<String>>(&mut self, name: S, params: Value) -> Result<()> {
        self.add_custom(ComponentKind::Tokenizer, name, ComponentParams::try_from(params)?)
    }

    pub fn add_custom_char_filter<S: Into<String>>(&mut self, name: S, params: Value) -> Result<()> {
        self.add_custom(ComponentKind::CharFilter, name, ComponentParams::try_from(params)?)
    }

    pub fn add_custom_token_filter<S: Into<String>>(&mut self, name: S, params: Value) -> Result<()> {
        self.add_custom(ComponentKind::TokenFilter, name, ComponentParams::try_from(params)?)
    }

    pub fn custom_analysis(&self) -> &CustomAnalysis {
        &self.custom_analysis
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    /// Registry access for registering application components before freezing.
    pub fn registry_mut(&mut self) -> &mut ComponentRegistry {
        &mut self.registry
    }

    /// Every document mapping with a label for error reporting.
    fn labelled_mappings(&self) -> impl Iterator<Item = (String, &DocumentMapping)> + '_ {
        self.type_mapping
            .iter()
            .map(|(name, mapping)| (format!("type '{name}'"), mapping))
            .chain(std::iter::once((
                "default mapping".to_string(),
                &self.default_mapping,
            )))
    }

    /// Validate the mapping and build every analyzer it refers to.
    ///
    /// All problems are collected and returned together as
    /// [`PaviseError::Configuration`]. On success the returned mapping owns a
    /// closed copy of the registry; this mapping is left untouched, so
    /// freezing twice yields equal results.
    pub fn freeze(&self) -> Result<FrozenIndexMapping> {
        let mut issues = Vec::new();

        if let Err(message) = validate_field_name(&self.type_field) {
            issues.push(ConfigIssue::new("type_field", message));
        }
        if !self.default_field.is_empty()
            && let Err(message) = validate_field_name(&self.default_field)
        {
            issues.push(ConfigIssue::new("default_field", message));
        }

        for spec in self.custom_analysis.all() {
            if self.registry.contains(spec.kind, &spec.name) {
                issues.push(ConfigIssue::new(
                    format!("custom {} '{}'", spec.kind, spec.name),
                    format!("shadows the registered {} of the same name", spec.kind),
                ));
            }
        }

        let mut cache = AnalysisCache::new(&self.registry, &self.custom_analysis);

        for spec in self.custom_analysis.all() {
            let built = match spec.kind {
                ComponentKind::Tokenizer => cache.tokenizer_named(&spec.name).map(drop),
                ComponentKind::CharFilter => cache.char_filter_named(&spec.name).map(drop),
                ComponentKind::TokenFilter => cache.token_filter_named(&spec.name).map(drop),
                ComponentKind::Analyzer => cache.analyzer_named(&spec.name).map(drop),
            };
            if let Err(e) = built {
                issues.push(ConfigIssue::new(
                    format!("custom {} '{}'", spec.kind, spec.name),
                    e.to_string(),
                ));
            }
        }

        if self.default_analyzer.is_empty() {
            issues.push(ConfigIssue::new("default_analyzer", "must not be empty"));
        } else if let Err(e) = cache.analyzer_named(&self.default_analyzer) {
            issues.push(ConfigIssue::new("default_analyzer", e.to_string()));
        }

        for (label, mapping) in self.labelled_mappings() {
            for (path, analyzer) in mapping.default_analyzers() {
                if let Err(e) = cache.analyzer_named(analyzer) {
                    let subject = if path.is_empty() {
                        format!("{label} default analyzer")
                    } else {
                        format!("{label} default analyzer at '{path}'")
                    };
                    issues.push(ConfigIssue::new(subject, e.to_string()));
                }
            }

            for (path, field) in mapping.walk_field_mappings() {
                let subject = format!("{label} field '{path}'");
                if let Some(name) = &field.name
                    && (name.contains(crate::mapping::PATH_SEPARATOR)
                        || validate_field_name(name).is_err())
                {
                    issues.push(ConfigIssue::new(
                        subject.clone(),
                        format!("invalid field name '{name}'"),
                    ));
                }
                match &field.analyzer {
                    Some(analyzer) if field.is_text() => {
                        if let Err(e) = cache.analyzer_named(analyzer) {
                            issues.push(ConfigIssue::new(subject, e.to_string()));
                        }
                    }
                    Some(analyzer) => issues.push(ConfigIssue::new(
                        subject,
                        format!(
                            "analyzer '{analyzer}' set on a {} field",
                            field.field_type.as_str()
                        ),
                    )),
                    None => {}
                }
            }
        }

        if !issues.is_empty() {
            return Err(PaviseError::configuration(issues));
        }

        let analyzers = cache.into_analyzers();
        let mut frozen = self.clone();
        frozen.registry.close();
        info!(
            "froze index mapping: {} types, {} analyzers",
            frozen.type_mapping.len(),
            analyzers.len()
        );
        Ok(FrozenIndexMapping::new(frozen, analyzers))
    }
}

impl Default for IndexMapping {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares everything except the registry, whose constructors are opaque.
impl PartialEq for IndexMapping {
    fn eq(&self, other: &Self) -> bool {
        self.type_mapping == other.type_mapping
            && self.default_mapping == other.default_mapping
            && self.type_field == other.type_field
            && self.default_type == other.default_type
            && self.default_analyzer == other.default_analyzer
            && self.default_field == other.default_field
            && self.index_dynamic == other.index_dynamic
            && self.store_dynamic == other.store_dynamic
            && self.custom_analysis == other.custom_analysis
    }
}
