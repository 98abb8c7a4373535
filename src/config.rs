//! JSON configuration of index mappings.
//!
//! The configuration mirrors [`IndexMapping`] as nested serde structs. Every
//! field has a default, so a minimal file only names what differs:
//!
//! ```json
//! {
//!   "type_field": "type",
//!   "default_analyzer": "en",
//!   "types": {
//!     "beer": {
//!       "properties": {
//!         "name": { "fields": [{ "type": "text", "analyzer": "en" }] }
//!       }
//!     }
//!   },
//!   "analysis": {
//!     "token_filters": { "notTooLong": { "type": "truncate_token", "length": 5 } }
//!   }
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mapping::document::DocumentMapping;
use crate::mapping::field::FieldMapping;
use crate::mapping::index::{
    DEFAULT_ANALYZER, DEFAULT_FIELD, DEFAULT_TYPE, DEFAULT_TYPE_FIELD, IndexMapping,
};
use crate::registry::{ComponentKind, ComponentParams, ComponentRegistry};

fn default_true() -> bool {
    true
}

fn default_type_field() -> String {
    DEFAULT_TYPE_FIELD.to_string()
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

fn default_analyzer() -> String {
    DEFAULT_ANALYZER.to_string()
}

fn default_field() -> String {
    DEFAULT_FIELD.to_string()
}

/// Configuration of one document mapping node and everything below it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DocumentMappingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub dynamic: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_analyzer: Option<String>,

    /// Field mappings for the value at this node
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldMapping>,

    /// Child nodes keyed by path segment
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, DocumentMappingConfig>,
}

impl Default for DocumentMappingConfig {
    fn default() -> Self {
        DocumentMappingConfig {
            enabled: true,
            dynamic: true,
            default_analyzer: None,
            fields: Vec::new(),
            properties: BTreeMap::new(),
        }
    }
}

/// Custom analysis components keyed by name. Each value holds the
/// component's `"type"` and its params.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub analyzers: BTreeMap<String, ComponentParams>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokenizers: BTreeMap<String, ComponentParams>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub char_filters: BTreeMap<String, ComponentParams>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub token_filters: BTreeMap<String, ComponentParams>,
}

impl AnalysisConfig {
    fn section(&self, kind: ComponentKind) -> &BTreeMap<String, ComponentParams> {
        match kind {
            ComponentKind::Analyzer => &self.analyzers,
            ComponentKind::Tokenizer => &self.tokenizers,
            ComponentKind::CharFilter => &self.char_filters,
            ComponentKind::TokenFilter => &self.token_filters,
        }
    }

    fn section_mut(&mut self, kind: ComponentKind) -> &mut BTreeMap<String, ComponentParams> {
        match kind {
            ComponentKind::Analyzer => &mut self.analyzers,
            ComponentKind::Tokenizer => &mut self.tokenizers,
            ComponentKind::CharFilter => &mut self.char_filters,
            ComponentKind::TokenFilter => &mut self.token_filters,
        }
    }
}

/// Configuration of a whole index mapping.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexMappingConfig {
    #[serde(default)]
    pub types: BTreeMap<String, DocumentMappingConfig>,

    #[serde(default)]
    pub default_mapping: DocumentMappingConfig,

    #[serde(default = "default_type_field")]
    pub type_field: String,

    #[serde(default = "default_type")]
    pub default_type: String,

    #[serde(default = "default_analyzer")]
    pub default_analyzer: String,

    #[serde(default = "default_field")]
    pub default_field: String,

    #[serde(default = "default_true")]
    pub index_dynamic: bool,

    #[serde(default = "default_true")]
    pub store_dynamic: bool,

    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl Default for IndexMappingConfig {
    fn default() -> Self {
        IndexMappingConfig {
            types: BTreeMap::new(),
            default_mapping: DocumentMappingConfig::default(),
            type_field: default_type_field(),
            default_type: default_type(),
            default_analyzer: default_analyzer(),
            default_field: default_field(),
            index_dynamic: true,
            store_dynamic: true,
            analysis: AnalysisConfig::default(),
        }
    }
}

impl IndexMapping {
    /// Build a mapping from configuration, using the built-in registry.
    pub fn from_config(config: &IndexMappingConfig) -> Result<Self> {
        Self::from_config_with_registry(config, ComponentRegistry::new())
    }

    /// Build a mapping from configuration on top of `registry`.
    pub fn from_config_with_registry(
        config: &IndexMappingConfig,
        registry: ComponentRegistry,
    ) -> Result<Self> {
        let mut mapping = IndexMapping::with_registry(registry);
        mapping.type_field = config.type_field.clone();
        mapping.default_type = config.default_type.clone();
        mapping.default_analyzer = config.default_analyzer.clone();
        mapping.default_field = config.default_field.clone();
        mapping.index_dynamic = config.index_dynamic;
        mapping.store_dynamic = config.store_dynamic;
        mapping.default_mapping = DocumentMapping::from_config(&config.default_mapping)?;

        for (type_name, type_config) in &config.types {
            mapping.add_document_mapping(type_name.clone(), DocumentMapping::from_config(type_config)?);
        }
        for kind in ComponentKind::ALL {
            for (name, params) in config.analysis.section(kind) {
                mapping.add_custom(kind, name.clone(), params.clone())?;
            }
        }
        debug!(
            "loaded index mapping with {} types and {} custom components",
            config.types.len(),
            mapping.custom_analysis().len()
        );
        Ok(mapping)
    }

    /// The configuration form of this mapping.
    pub fn to_config(&self) -> IndexMappingConfig {
        let mut analysis = AnalysisConfig::default();
        for spec in self.custom_analysis().all() {
            analysis
                .section_mut(spec.kind)
                .insert(spec.name.clone(), spec.params.clone());
        }
        IndexMappingConfig {
            types: self
                .type_mappings()
                .iter()
                .map(|(name, mapping)| (name.clone(), mapping.to_config()))
                .collect(),
            default_mapping: self.default_mapping.to_config(),
            type_field: self.type_field.clone(),
            default_type: self.default_type.clone(),
            default_analyzer: self.default_analyzer.clone(),
            default_field: self.default_field.clone(),
            index_dynamic: self.index_dynamic,
            store_dynamic: self.store_dynamic,
            analysis,
        }
    }

    /// Parse a mapping from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_json_with_registry(json, ComponentRegistry::new())
    }

    /// Parse a mapping from JSON on top of `registry`.
    pub fn from_json_with_registry(json: &str, registry: ComponentRegistry) -> Result<Self> {
        let config: IndexMappingConfig = serde_json::from_str(json)?;
        Self::from_config_with_registry(&config, registry)
    }

    /// Read a mapping from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path.as_ref())?;
        debug!("read index mapping from {}", path.as_ref().display());
        Self::from_json(&json)
    }

    /// Serialize the mapping as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_config())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PaviseError;
    use serde_json::json;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: IndexMappingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, IndexMappingConfig::default());

        let mapping = IndexMapping::from_config(&config).unwrap();
        assert_eq!(mapping, IndexMapping::new());
    }

    #[test]
    fn test_field_defaults_in_config() {
        let config: DocumentMappingConfig = serde_json::from_value(json!({
            "fields": [{"analyzer": "en"}, {"type": "number", "store": false}]
        }))
        .unwrap();

        assert!(config.enabled && config.dynamic);
        let text = &config.fields[0];
        assert!(text.is_text() && text.store && text.index && text.include_in_all);
        assert!(!config.fields[1].store);
    }

    #[test]
    fn test_json_round_trip() {
        let json = json!({
            "type_field": "type",
            "default_analyzer": "en",
            "types": {
                "beer": {
                    "properties": {
                        "name": {"fields": [{"type": "text", "analyzer": "en"}]}
                    }
                }
            },
            "analysis": {
                "token_filters": {"notTooLong": {"type": "truncate_token", "length": 5}}
            }
        })
        .to_string();

        let mapping = IndexMapping::from_json(&json).unwrap();
        assert_eq!(mapping.type_field, "type");
        assert_eq!(mapping.custom_analysis().len(), 1);

        let reparsed = IndexMapping::from_json(&mapping.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, mapping);
    }

    #[test]
    fn test_malformed_json() {
        let err = IndexMapping::from_json("{\"types\": 3}").unwrap_err();
        assert!(matches!(err, PaviseError::Json(_)));

        let err = IndexMapping::from_json(
            r#"{"analysis": {"analyzers": {"a": "custom"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, PaviseError::Json(_)));
    }
}
