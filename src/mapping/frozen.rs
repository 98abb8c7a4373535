//! Validated, immutable index mappings and document analysis.
//!
//! A [`FrozenIndexMapping`] is produced by
//! [`IndexMapping::freeze`](crate::mapping::index::IndexMapping::freeze). Every
//! analyzer it can hand out was built during the freeze, so analyzing a
//! document never meets an unresolved name. The frozen mapping is cheap to
//! clone and can be shared across indexing threads.

use std::sync::Arc;

use ahash::AHashMap;
use log::{debug, warn};
use serde::Serialize;
use serde_json::Value;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::token::Token;
use crate::error::{PaviseError, Result};
use crate::mapping::PATH_SEPARATOR;
use crate::mapping::document::DocumentMapping;
use crate::mapping::field::FieldType;
use crate::mapping::index::IndexMapping;
use crate::mapping::resolver::{MappingResolver, ResolvedField};

/// One indexed field of an analyzed document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyzedField {
    /// Indexed field name
    pub name: String,
    /// Document path the value came from
    pub path: String,
    pub field_type: FieldType,
    pub analyzer: Option<String>,
    pub tokens: Vec<Token>,
    /// The original value, if the field is stored
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stored: Option<Value>,
    pub include_in_all: bool,
    pub include_term_vectors: bool,
    pub dynamic: bool,
}

/// The composite field built from every field included in it.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CompositeField {
    pub name: String,
    pub tokens: Vec<Token>,
}

/// The result of analyzing one document.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AnalyzedDocument {
    pub type_name: String,
    pub fields: Vec<AnalyzedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeField>,
}

impl AnalyzedDocument {
    /// Fields indexed under `name`.
    pub fn fields_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a AnalyzedField> + 'a {
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// Total number of tokens over all fields, the composite excluded.
    pub fn token_count(&self) -> usize {
        self.fields.iter().map(|f| f.tokens.len()).sum()
    }
}

/// An immutable, validated index mapping.
#[derive(Clone)]
pub struct FrozenIndexMapping {
    mapping: Arc<IndexMapping>,
    analyzers: Arc<AHashMap<String, Arc<dyn Analyzer>>>,
}

impl FrozenIndexMapping {
    pub(crate) fn new(mapping: IndexMapping, analyzers: AHashMap<String, Arc<dyn Analyzer>>) -> Self {
        FrozenIndexMapping {
            mapping: Arc::new(mapping),
            analyzers: Arc::new(analyzers),
        }
    }

    /// The mapping this was frozen from, with its registry closed.
    pub fn mapping(&self) -> &IndexMapping {
        &self.mapping
    }

    pub fn resolver(&self) -> MappingResolver<'_> {
        MappingResolver::new(&self.mapping)
    }

    /// The analyzer built under `name`.
    pub fn analyzer(&self, name: &str) -> Result<Arc<dyn Analyzer>> {
        self.analyzers.get(name).cloned().ok_or_else(|| {
            PaviseError::unknown_component(crate::registry::ComponentKind::Analyzer, name)
        })
    }

    /// Names of every analyzer available, sorted.
    pub fn analyzer_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.analyzers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the analyzer `name` over `text`, dropping stopped tokens.
    pub fn analyze_text(&self, analyzer: &str, text: &str) -> Result<Vec<Token>> {
        let analyzer = self.analyzer(analyzer)?;
        Ok(analyzer.analyze(text)?.filter(|t| !t.is_stopped()).collect())
    }

    pub fn resolve_field(&self, type_name: &str, path: &str) -> Result<Vec<ResolvedField>> {
        self.resolver().resolve_field(type_name, path)
    }

    pub fn resolve_analyzer(&self, type_name: &str, path: &str) -> Result<Vec<String>> {
        self.resolver().resolve_analyzer(type_name, path)
    }

    /// The type of `document`: the string at the type field, else the default type.
    pub fn determine_type(&self, document: &Value) -> String {
        let mut current = document;
        for segment in self.mapping.type_field.split(PATH_SEPARATOR) {
            match current.get(segment) {
                Some(value) => current = value,
                None => return self.mapping.default_type.clone(),
            }
        }
        match current.as_str() {
            Some(type_name) if !type_name.is_empty() => type_name.to_string(),
            _ => self.mapping.default_type.clone(),
        }
    }

    /// Analyze every mapped value of a JSON document.
    ///
    /// Arrays contribute each element under the same path. Nulls are skipped.
    pub fn analyze_document(&self, document: &Value) -> Result<AnalyzedDocument> {
        let object = document.as_object().ok_or_else(|| {
            PaviseError::invalid_argument("document must be a JSON object")
        })?;

        let type_name = self.determine_type(document);
        let doc_mapping = self.mapping.mapping_for_type(&type_name);
        let mut analyzed = AnalyzedDocument {
            type_name,
            fields: Vec::new(),
            composite: None,
        };

        if !doc_mapping.enabled() {
            debug!("type '{}' is disabled, nothing to index", analyzed.type_name);
            return Ok(analyzed);
        }

        let mut walker = DocumentWalker {
            frozen: self,
            doc_mapping,
            type_name: &analyzed.type_name,
            fields: Vec::new(),
        };
        for (key, value) in object {
            walker.visit_member(None, key, value)?;
        }
        analyzed.fields = walker.fields;
        analyzed.composite = self.composite(&analyzed.fields);
        Ok(analyzed)
    }

    fn composite(&self, fields: &[AnalyzedField]) -> Option<CompositeField> {
        if self.mapping.default_field.is_empty() {
            return None;
        }
        let mut tokens = Vec::new();
        let mut next_position = 0;
        for field in fields.iter().filter(|f| f.include_in_all) {
            let base = next_position;
            for token in &field.tokens {
                let position = base + token.position;
                next_position = next_position.max(position + 1);
                tokens.push(token.clone().with_position(position));
            }
        }
        Some(CompositeField {
            name: self.mapping.default_field.clone(),
            tokens,
        })
    }
}

impl std::fmt::Debug for FrozenIndexMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrozenIndexMapping")
            .field("mapping", &self.mapping)
            .field("analyzers", &self.analyzer_names())
            .finish()
    }
}

impl PartialEq for FrozenIndexMapping {
    fn eq(&self, other: &Self) -> bool {
        self.mapping == other.mapping && self.analyzer_names() == other.analyzer_names()
    }
}

struct DocumentWalker<'a> {
    frozen: &'a FrozenIndexMapping,
    doc_mapping: &'a DocumentMapping,
    type_name: &'a str,
    fields: Vec<AnalyzedField>,
}

impl DocumentWalker<'_> {
    /// Visit `key` of the object at `parent`. Keys that cannot name a path
    /// segment are skipped.
    fn visit_member(&mut self, parent: Option<&str>, key: &str, value: &Value) -> Result<()> {
        if key.is_empty() || key.contains(PATH_SEPARATOR) {
            warn!(
                "skipping key '{key}' under '{}' of type '{}': not a valid path segment",
                parent.unwrap_or_default(),
                self.type_name
            );
            return Ok(());
        }
        let path = match parent {
            Some(parent) => format!("{parent}{PATH_SEPARATOR}{key}"),
            None => key.to_string(),
        };
        self.visit(path, value)
    }

    fn visit(&mut self, path: String, value: &Value) -> Result<()> {
        if !self.doc_mapping.is_enabled_at(&path) {
            debug!("skipping disabled path '{path}'");
            return Ok(());
        }
        match value {
            Value::Null => Ok(()),
            Value::Object(object) => {
                for (key, child) in object {
                    self.visit_member(Some(&path), key, child)?;
                }
                Ok(())
            }
            Value::Array(items) => {
                for item in items {
                    self.visit(path.clone(), item)?;
                }
                Ok(())
            }
            leaf => self.index_leaf(&path, leaf),
        }
    }

    fn index_leaf(&mut self, path: &str, value: &Value) -> Result<()> {
        for resolved in self.frozen.resolve_field(self.type_name, path)? {
            if resolved.dynamic && !self.doc_mapping.is_dynamic_at(path) {
                warn!(
                    "skipping unmapped field '{path}' of type '{}': mapping is not dynamic",
                    self.type_name
                );
                continue;
            }
            if !resolved.index {
                continue;
            }
            if let Some(field) = self.analyze_value(resolved, value)? {
                self.fields.push(field);
            }
        }
        Ok(())
    }

    fn analyze_value(&self, resolved: ResolvedField, value: &Value) -> Result<Option<AnalyzedField>> {
        // Dynamic fields take their type from the value.
        let field_type = match (resolved.dynamic, value) {
            (true, Value::Number(_)) => FieldType::Number,
            (true, Value::Bool(_)) => FieldType::Boolean,
            _ => resolved.field_type,
        };

        let (analyzer, tokens) = match field_type {
            FieldType::Text => {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                match resolved.analyzer {
                    Some(name) => {
                        let tokens = self.frozen.analyze_text(&name, &text)?;
                        (Some(name), tokens)
                    }
                    None => return Ok(None),
                }
            }
            FieldType::Number => match number_term(value) {
                Some(term) => (None, vec![single_token(term)]),
                None => {
                    warn!("field '{}' expects a number, got {value}", resolved.path);
                    return Ok(None);
                }
            },
            FieldType::Boolean => match boolean_term(value) {
                Some(term) => (None, vec![single_token(term)]),
                None => {
                    warn!("field '{}' expects a boolean, got {value}", resolved.path);
                    return Ok(None);
                }
            },
        };

        Ok(Some(AnalyzedField {
            name: resolved.field_name,
            path: resolved.path,
            field_type,
            analyzer,
            tokens,
            stored: resolved.store.then(|| value.clone()),
            include_in_all: resolved.include_in_all,
            include_term_vectors: resolved.include_term_vectors,
            dynamic: resolved.dynamic,
        }))
    }
}

fn single_token(term: String) -> Token {
    let len = term.len();
    Token::with_offsets(term, 0, 0, len)
}

/// Numbers are indexed by their `f64` value, so `5`, `5.0` and `"5.0"` share
/// the term `"5"`.
fn number_term(value: &Value) -> Option<String> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !number.is_finite() {
        return None;
    }
    // -0.0 and 0.0 are the same value
    Some((number + 0.0).to_string())
}

fn boolean_term(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::String(s) => s.trim().parse::<bool>().ok().map(|b| b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::field::FieldMapping;
    use serde_json::json;

    fn frozen() -> FrozenIndexMapping {
        let mut mapping = IndexMapping::new()
            .with_type_field("type")
            .with_default_analyzer("en");

        let mut beer = DocumentMapping::new();
        beer.add_field_mappings_at(
            "name",
            [FieldMapping::new_text_field_mapping().with_analyzer("keyword")],
        )
        .unwrap();
        beer.add_field_mappings_at(
            "abv",
            [FieldMapping::new_number_field_mapping().with_include_in_all(false)],
        )
        .unwrap();
        beer.add_field_mappings_at(
            "internal_notes",
            [FieldMapping::new_text_field_mapping().with_index(false)],
        )
        .unwrap();
        beer.add_sub_document_mapping("meta", DocumentMapping::new().with_enabled(false))
            .unwrap();
        mapping.add_document_mapping("beer", beer);

        mapping.add_document_mapping("secret", DocumentMapping::new().with_enabled(false));
        mapping.add_document_mapping(
            "strict",
            DocumentMapping::new().with_dynamic(false),
        );
        mapping.freeze().unwrap()
    }

    #[test]
    fn test_determine_type() {
        let frozen = frozen();
        assert_eq!(frozen.determine_type(&json!({"type": "beer"})), "beer");
        assert_eq!(frozen.determine_type(&json!({"name": "x"})), "_default");
        assert_eq!(frozen.determine_type(&json!({"type": 3})), "_default");
    }

    #[test]
    fn test_analyze_document() {
        let frozen = frozen();
        let doc = json!({
            "type": "beer",
            "name": "Hoppy Ale",
            "abv": 5.5,
            "internal_notes": "not indexed",
            "meta": {"source": "import"},
            "tags": ["pale", null]
        });
        let analyzed = frozen.analyze_document(&doc).unwrap();
        assert_eq!(analyzed.type_name, "beer");

        let names: Vec<_> = analyzed.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["abv", "name", "tags", "type"]);

        let name = analyzed.fields_named("name").next().unwrap();
        assert_eq!(name.tokens[0].text, "Hoppy Ale");
        assert!(!name.dynamic);

        let abv = analyzed.fields_named("abv").next().unwrap();
        assert_eq!(abv.field_type, FieldType::Number);
        assert_eq!(abv.tokens[0].text, "5.5");

        let tags = analyzed.fields_named("tags").next().unwrap();
        assert!(tags.dynamic);
        assert_eq!(tags.analyzer.as_deref(), Some("en"));

        let composite = analyzed.composite.unwrap();
        assert_eq!(composite.name, "_all");
        let terms: Vec<_> = composite.tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(terms, vec!["Hoppy Ale", "pale", "beer"]);
        let positions: Vec<_> = composite.tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
    }

    #[test]
    fn test_keys_that_are_not_path_segments_are_skipped() {
        let frozen = frozen();
        let doc = json!({
            "type": "beer",
            "name": "Ale",
            "": "empty",
            "brewery.name": "dotted",
            "brewery": {"": "empty", "city": "Portland"}
        });
        let analyzed = frozen.analyze_document(&doc).unwrap();

        let mut names: Vec<_> = analyzed.fields.iter().map(|f| f.name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["brewery.city", "name", "type"]);
    }

    #[test]
    fn test_number_terms_do_not_depend_on_notation() {
        assert_eq!(number_term(&json!(5)).as_deref(), Some("5"));
        assert_eq!(number_term(&json!(5.0)).as_deref(), Some("5"));
        assert_eq!(number_term(&json!("5.0")).as_deref(), Some("5"));
        assert_eq!(number_term(&json!(-0.0)).as_deref(), Some("0"));
        assert_eq!(number_term(&json!("6.25")).as_deref(), Some("6.25"));
        assert_eq!(number_term(&json!("NaN")), None);
        assert_eq!(number_term(&json!("strong")), None);

        let frozen = frozen();
        let terms: Vec<String> = [json!(5), json!(5.0), json!("5.0")]
            .into_iter()
            .map(|abv| {
                let analyzed = frozen
                    .analyze_document(&json!({"type": "beer", "abv": abv}))
                    .unwrap();
                analyzed.fields_named("abv").next().unwrap().tokens[0].text.clone()
            })
            .collect();
        assert_eq!(terms, vec!["5", "5", "5"]);
    }

    #[test]
    fn test_boolean_terms() {
        assert_eq!(boolean_term(&json!(true)).as_deref(), Some("true"));
        assert_eq!(boolean_term(&json!(" false ")).as_deref(), Some("false"));
        assert_eq!(boolean_term(&json!("T")), None);
    }

    #[test]
    fn test_disabled_and_strict_types() {
        let frozen = frozen();

        let secret = frozen
            .analyze_document(&json!({"type": "secret", "name": "x"}))
            .unwrap();
        assert!(secret.fields.is_empty());
        assert!(secret.composite.is_none());

        let strict = frozen
            .analyze_document(&json!({"type": "strict", "name": "x"}))
            .unwrap();
        assert!(strict.fields.is_empty());
    }

    #[test]
    fn test_analyze_text_and_unknown_analyzer() {
        let frozen = frozen();
        let tokens = frozen.analyze_text("en", "The brewers").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].text, "brewer");
        assert!(frozen.analyze_text("french", "bière").is_err());
        assert!(frozen.analyze_document(&json!(["not", "an", "object"])).is_err());
    }

    #[test]
    fn test_frozen_mapping_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<FrozenIndexMapping>();
    }
}
