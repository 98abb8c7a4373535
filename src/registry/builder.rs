//! Analyzer builder.
//!
//! Turns named references into concrete components. A name is looked up first
//! among the custom components declared on an index mapping; a custom
//! component's `"type"` picks the registry constructor and its params are
//! handed to that constructor. Names with no custom definition are resolved
//! directly in the registry with empty params.
//!
//! Every component is built at most once per [`AnalysisCache`], so two custom
//! analyzers that share a custom token filter share the same instance.

use std::collections::BTreeMap;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::pipeline::PipelineAnalyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{PaviseError, Result};
use crate::registry::{ComponentKind, ComponentParams, ComponentRegistry, ComponentSpec};

/// Referrer used when a name comes straight from the index mapping.
const MAPPING_REFERRER: &str = "index mapping";

/// Declarative description of a pipeline analyzer.
///
/// Token filter order is significant: filters run in the listed order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerDefinition {
    pub name: String,
    pub tokenizer: String,
    #[serde(default)]
    pub char_filters: Vec<String>,
    #[serde(default)]
    pub token_filters: Vec<String>,
}

impl AnalyzerDefinition {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, tokenizer: T) -> Self {
        AnalyzerDefinition {
            name: name.into(),
            tokenizer: tokenizer.into(),
            char_filters: Vec::new(),
            token_filters: Vec::new(),
        }
    }

    pub fn with_char_filter<S: Into<String>>(mut self, name: S) -> Self {
        self.char_filters.push(name.into());
        self
    }

    pub fn with_token_filter<S: Into<String>>(mut self, name: S) -> Self {
        self.token_filters.push(name.into());
        self
    }

    /// Read a definition from `custom` analyzer params.
    pub fn from_params(name: &str, params: &ComponentParams) -> Result<Self> {
        let tokenizer = params.require_str("tokenizer").map_err(|e| {
            PaviseError::invalid_config(format!("custom analyzer '{name}': {e}"))
        })?;
        Ok(AnalyzerDefinition {
            name: name.to_string(),
            tokenizer: tokenizer.to_string(),
            char_filters: params.get_str_list("char_filters")?.unwrap_or_default(),
            token_filters: params.get_str_list("token_filters")?.unwrap_or_default(),
        })
    }
}

/// Custom components declared on an index mapping, keyed by kind and name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomAnalysis {
    specs: BTreeMap<(ComponentKind, String), ComponentSpec>,
}

impl CustomAnalysis {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a custom component. Names are unique per kind.
    pub fn add<S: Into<String>>(
        &mut self,
        kind: ComponentKind,
        name: S,
        params: ComponentParams,
    ) -> Result<()> {
        let name = name.into();
        let key = (kind, name.clone());
        if self.specs.contains_key(&key) {
            return Err(PaviseError::duplicate_name(format!("custom {kind}"), name));
        }
        self.specs.insert(key, ComponentSpec::new(name, kind, params));
        Ok(())
    }

    pub fn get(&self, kind: ComponentKind, name: &str) -> Option<&ComponentSpec> {
        self.specs.get(&(kind, name.to_string()))
    }

    /// Custom components of one kind, ordered by name.
    pub fn iter(&self, kind: ComponentKind) -> impl Iterator<Item = &ComponentSpec> + '_ {
        self.specs
            .iter()
            .filter(move |((k, _), _)| *k == kind)
            .map(|(_, spec)| spec)
    }

    /// All custom components ordered by kind, then name.
    pub fn all(&self) -> impl Iterator<Item = &ComponentSpec> + '_ {
        self.specs.values()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Builds and memoizes components for one registry and one set of custom
/// definitions.
pub struct AnalysisCache<'a> {
    registry: &'a ComponentRegistry,
    custom: &'a CustomAnalysis,
    tokenizers: AHashMap<String, Arc<dyn Tokenizer>>,
    char_filters: AHashMap<String, Arc<dyn CharFilter>>,
    token_filters: AHashMap<String, Arc<dyn Filter>>,
    analyzers: AHashMap<String, Arc<dyn Analyzer>>,
    building: Vec<String>,
}

impl<'a> AnalysisCache<'a> {
    pub fn new(registry: &'a ComponentRegistry, custom: &'a CustomAnalysis) -> Self {
        AnalysisCache {
            registry,
            custom,
            tokenizers: AHashMap::new(),
            char_filters: AHashMap::new(),
            token_filters: AHashMap::new(),
            analyzers: AHashMap::new(),
            building: Vec::new(),
        }
    }

    pub fn registry(&self) -> &'a ComponentRegistry {
        self.registry
    }

    /// Where a name leads: the registry constructor name and the params to
    /// call it with.
    fn target(&self, kind: ComponentKind, name: &str) -> Result<(String, ComponentParams)> {
        match self.custom.get(kind, name) {
            Some(spec) => {
                let constructor = spec.params.component_type().ok_or_else(|| {
                    PaviseError::invalid_config(format!(
                        "custom {kind} '{name}' has no \"type\""
                    ))
                })?;
                if !self.registry.contains(kind, constructor) {
                    return Err(PaviseError::unresolved_component(
                        kind,
                        constructor,
                        format!("custom {kind} '{name}'"),
                    ));
                }
                Ok((constructor.to_string(), spec.params.clone()))
            }
            None => {
                if !self.registry.contains(kind, name) {
                    return Err(PaviseError::unresolved_component(
                        kind,
                        name,
                        MAPPING_REFERRER,
                    ));
                }
                Ok((name.to_string(), ComponentParams::new()))
            }
        }
    }

    /// Get or build the tokenizer named `name`.
    pub fn tokenizer_named(&mut self, name: &str) -> Result<Arc<dyn Tokenizer>> {
        if let Some(tokenizer) = self.tokenizers.get(name) {
            return Ok(Arc::clone(tokenizer));
        }
        let (constructor, params) = self.target(ComponentKind::Tokenizer, name)?;
        let build = self.registry.resolve_tokenizer(&constructor)?;
        let tokenizer =
            build(&params).map_err(|e| Self::construction_failed(ComponentKind::Tokenizer, name, e))?;
        debug!("built tokenizer '{name}' from '{constructor}'");
        self.tokenizers.insert(name.to_string(), Arc::clone(&tokenizer));
        Ok(tokenizer)
    }

    /// Get or build the char filter named `name`.
    pub fn char_filter_named(&mut self, name: &str) -> Result<Arc<dyn CharFilter>> {
        if let Some(char_filter) = self.char_filters.get(name) {
            return Ok(Arc::clone(char_filter));
        }
        let (constructor, params) = self.target(ComponentKind::CharFilter, name)?;
        let build = self.registry.resolve_char_filter(&constructor)?;
        let char_filter =
            build(&params).map_err(|e| Self::construction_failed(ComponentKind::CharFilter, name, e))?;
        debug!("built char filter '{name}' from '{constructor}'");
        self.char_filters
            .insert(name.to_string(), Arc::clone(&char_filter));
        Ok(char_filter)
    }

    /// Get or build the token filter named `name`.
    pub fn token_filter_named(&mut self, name: &str) -> Result<Arc<dyn Filter>> {
        if let Some(filter) = self.token_filters.get(name) {
            return Ok(Arc::clone(filter));
        }
        let (constructor, params) = self.target(ComponentKind::TokenFilter, name)?;
        let build = self.registry.resolve_token_filter(&constructor)?;
        let filter =
            build(&params).map_err(|e| Self::construction_failed(ComponentKind::TokenFilter, name, e))?;
        debug!("built token filter '{name}' from '{constructor}'");
        self.token_filters.insert(name.to_string(), Arc::clone(&filter));
        Ok(filter)
    }

    /// Get or build the analyzer named `name`.
    pub fn analyzer_named(&mut self, name: &str) -> Result<Arc<dyn Analyzer>> {
        if let Some(analyzer) = self.analyzers.get(name) {
            return Ok(Arc::clone(analyzer));
        }
        if self.building.iter().any(|n| n == name) {
            return Err(PaviseError::invalid_config(format!(
                "analyzer '{name}' refers to itself through {}",
                self.building.join(" -> ")
            )));
        }
        let (constructor, params) = self.target(ComponentKind::Analyzer, name)?;
        let build = self.registry.resolve_analyzer(&constructor)?;

        self.building.push(name.to_string());
        let built = build(name, &params, self);
        self.building.pop();

        let analyzer = built.map_err(|e| match e {
            e @ (PaviseError::UnresolvedComponent { .. } | PaviseError::InvalidOperation(_)) => e,
            e => Self::construction_failed(ComponentKind::Analyzer, name, e),
        })?;
        debug!("built analyzer '{name}' from '{constructor}'");
        self.analyzers.insert(name.to_string(), Arc::clone(&analyzer));
        Ok(analyzer)
    }

    /// Build a pipeline analyzer from a definition.
    ///
    /// Every referenced component is checked before any is built, so the error
    /// names the first missing component together with the analyzer that
    /// referenced it.
    pub fn build(&mut self, definition: &AnalyzerDefinition) -> Result<PipelineAnalyzer> {
        let referrer = format!("analyzer '{}'", definition.name);
        self.check_reference(ComponentKind::Tokenizer, &definition.tokenizer, &referrer)?;
        for name in &definition.char_filters {
            self.check_reference(ComponentKind::CharFilter, name, &referrer)?;
        }
        for name in &definition.token_filters {
            self.check_reference(ComponentKind::TokenFilter, name, &referrer)?;
        }

        let mut analyzer = PipelineAnalyzer::new(self.tokenizer_named(&definition.tokenizer)?);
        for name in &definition.char_filters {
            analyzer = analyzer.add_char_filter(self.char_filter_named(name)?);
        }
        for name in &definition.token_filters {
            analyzer = analyzer.add_filter(self.token_filter_named(name)?);
        }
        Ok(analyzer.with_name(definition.name.clone()))
    }

    fn check_reference(&self, kind: ComponentKind, name: &str, referrer: &str) -> Result<()> {
        if self.custom.get(kind, name).is_some() || self.registry.contains(kind, name) {
            Ok(())
        } else {
            Err(PaviseError::unresolved_component(kind, name, referrer))
        }
    }

    fn construction_failed(kind: ComponentKind, name: &str, error: PaviseError) -> PaviseError {
        match error {
            e @ PaviseError::UnresolvedComponent { .. } => e,
            e => PaviseError::invalid_config(format!("cannot build {kind} '{name}': {e}")),
        }
    }

    /// Every analyzer built so far, keyed by name.
    pub fn into_analyzers(self) -> AHashMap<String, Arc<dyn Analyzer>> {
        self.analyzers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: serde_json::Value) -> ComponentParams {
        ComponentParams::try_from(value).unwrap()
    }

    fn texts(analyzer: &dyn Analyzer, text: &str) -> Vec<String> {
        analyzer.analyze(text).unwrap().map(|t| t.text).collect()
    }

    fn beer_analysis() -> CustomAnalysis {
        let mut custom = CustomAnalysis::new();
        custom
            .add(
                ComponentKind::TokenFilter,
                "notTooLong",
                params(json!({"type": "truncate_token", "length": 5.0})),
            )
            .unwrap();
        custom
            .add(
                ComponentKind::Analyzer,
                "enNotTooLong",
                params(json!({
                    "type": "custom",
                    "tokenizer": "unicode",
                    "token_filters": ["notTooLong", "possessive_en", "to_lower", "stop_en", "stemmer_porter"]
                })),
            )
            .unwrap();
        custom
    }

    #[test]
    fn test_build_definition() {
        let registry = ComponentRegistry::new();
        let custom = CustomAnalysis::new();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let definition = AnalyzerDefinition::new("lower_ws", "whitespace").with_token_filter("to_lower");
        let analyzer = cache.build(&definition).unwrap();

        assert_eq!(analyzer.name(), "lower_ws");
        assert_eq!(texts(&analyzer, "Pale ALE"), vec!["pale", "ale"]);
    }

    #[test]
    fn test_custom_analyzer_with_custom_filter() {
        let registry = ComponentRegistry::new();
        let custom = beer_analysis();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let analyzer = cache.analyzer_named("enNotTooLong").unwrap();
        assert_eq!(analyzer.name(), "enNotTooLong");
        assert_eq!(texts(analyzer.as_ref(), "Hoppiness Brewing"), vec!["hoppi", "brewi"]);
    }

    #[test]
    fn test_components_are_memoized() {
        let registry = ComponentRegistry::new();
        let custom = beer_analysis();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let a = cache.token_filter_named("notTooLong").unwrap();
        let b = cache.token_filter_named("notTooLong").unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let x = cache.analyzer_named("enNotTooLong").unwrap();
        let y = cache.analyzer_named("enNotTooLong").unwrap();
        assert!(Arc::ptr_eq(&x, &y));
    }

    #[test]
    fn test_missing_filter_is_reported_with_referrer() {
        let registry = ComponentRegistry::new();
        let custom = CustomAnalysis::new();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let definition = AnalyzerDefinition::new("broken", "unicode").with_token_filter("no_such_filter");
        match cache.build(&definition).unwrap_err() {
            PaviseError::UnresolvedComponent {
                kind,
                name,
                referenced_by,
            } => {
                assert_eq!(kind, ComponentKind::TokenFilter);
                assert_eq!(name, "no_such_filter");
                assert_eq!(referenced_by, "analyzer 'broken'");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_custom_spec_with_unknown_type() {
        let registry = ComponentRegistry::new();
        let mut custom = CustomAnalysis::new();
        custom
            .add(
                ComponentKind::TokenFilter,
                "shout",
                params(json!({"type": "to_upper"})),
            )
            .unwrap();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let err = cache.token_filter_named("shout").err().unwrap();
        assert_eq!(
            err.to_string(),
            "Unresolved token filter 'to_upper' referenced by custom token filter 'shout'"
        );
    }

    #[test]
    fn test_invalid_params_are_configuration_errors() {
        let registry = ComponentRegistry::new();
        let mut custom = CustomAnalysis::new();
        custom
            .add(
                ComponentKind::TokenFilter,
                "tooShort",
                params(json!({"type": "truncate_token", "length": "five"})),
            )
            .unwrap();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let err = cache.token_filter_named("tooShort").err().unwrap();
        assert!(err.to_string().contains("tooShort"));
    }

    #[test]
    fn test_self_referencing_analyzer() {
        let mut registry = ComponentRegistry::new();
        registry
            .register_analyzer("recursive", |name, _params, cache| cache.analyzer_named(name))
            .unwrap();
        let custom = CustomAnalysis::new();
        let mut cache = AnalysisCache::new(&registry, &custom);

        let err = cache.analyzer_named("recursive").err().unwrap();
        assert!(err.to_string().contains("refers to itself"));
    }

    #[test]
    fn test_duplicate_custom_name() {
        let mut custom = beer_analysis();
        let err = custom
            .add(
                ComponentKind::TokenFilter,
                "notTooLong",
                params(json!({"type": "truncate_token", "length": 3})),
            )
            .unwrap_err();
        assert!(matches!(err, PaviseError::DuplicateName { .. }));

        // same name, different kind is fine
        custom
            .add(
                ComponentKind::Tokenizer,
                "notTooLong",
                params(json!({"type": "whitespace"})),
            )
            .unwrap();
        assert_eq!(custom.iter(ComponentKind::TokenFilter).count(), 1);
    }
}
