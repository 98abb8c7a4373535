//! Integration tests for the beer and brewery index mapping.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::json;

use pavise::analysis::analyzer::Analyzer;
use pavise::analysis::token::{IntoTokenStream, Token, TokenStream};
use pavise::error::{PaviseError, Result};
use pavise::mapping::document::DocumentMapping;
use pavise::mapping::field::FieldMapping;
use pavise::mapping::frozen::FrozenIndexMapping;
use pavise::mapping::index::IndexMapping;

/// Application analyzer tagging a text "en" when it is ASCII, "und" otherwise.
struct AsciiLang;

impl Analyzer for AsciiLang {
    fn analyze(&self, text: &str) -> Result<TokenStream> {
        let lang = if text.is_ascii() { "en" } else { "und" };
        Ok(vec![Token::with_offsets(lang, 0, 0, text.len())].into_token_stream())
    }

    fn name(&self) -> &str {
        "ascii_lang"
    }
}

fn register_ascii_lang(mapping: &mut IndexMapping) -> Result<()> {
    mapping
        .registry_mut()
        .register_analyzer("ascii_lang", |_name, _params, _cache| {
            let analyzer: Arc<dyn Analyzer> = Arc::new(AsciiLang);
            Ok(analyzer)
        })
}

fn build_index_mapping(lang_analyzer: &str) -> Result<IndexMapping> {
    let not_too_long = FieldMapping::new_text_field_mapping().with_analyzer("enNotTooLong");
    let english = FieldMapping::new_text_field_mapping().with_analyzer("en");
    let keyword = FieldMapping::new_text_field_mapping().with_analyzer("keyword");
    let description_lang = FieldMapping::new_text_field_mapping()
        .with_name("descriptionLang")
        .with_analyzer(lang_analyzer)
        .with_store(false)
        .with_include_term_vectors(false)
        .with_include_in_all(false);

    let mut beer = DocumentMapping::new();
    beer.add_field_mappings_at("name", [english.clone()])?;
    beer.add_field_mappings_at("description", [not_too_long, description_lang])?;
    beer.add_field_mappings_at("type", [keyword.clone()])?;
    beer.add_field_mappings_at("style", [keyword.clone()])?;
    beer.add_field_mappings_at("category", [keyword])?;

    let mut brewery = DocumentMapping::new();
    brewery.add_field_mappings_at("name", [english.clone()])?;
    brewery.add_field_mappings_at("description", [english])?;

    let mut mapping = IndexMapping::new()
        .with_type_field("type")
        .with_default_analyzer("en");
    mapping.add_document_mapping("beer", beer);
    mapping.add_document_mapping("brewery", brewery);

    mapping.add_custom_token_filter(
        "notTooLong",
        json!({"type": "truncate_token", "length": 5.0}),
    )?;
    mapping.add_custom_analyzer(
        "enNotTooLong",
        json!({
            "type": "custom",
            "tokenizer": "unicode",
            "token_filters": ["notTooLong", "possessive_en", "to_lower", "stop_en", "stemmer_porter"]
        }),
    )?;
    Ok(mapping)
}

fn frozen_beer_mapping() -> Result<FrozenIndexMapping> {
    let mut mapping = build_index_mapping("ascii_lang")?;
    register_ascii_lang(&mut mapping)?;
    mapping.freeze()
}

fn terms(tokens: &[Token]) -> Vec<&str> {
    tokens.iter().map(|t| t.text.as_str()).collect()
}

#[test]
fn test_field_level_analyzer_wins() -> Result<()> {
    let frozen = frozen_beer_mapping()?;

    assert_eq!(frozen.resolve_analyzer("beer", "name")?, vec!["en"]);
    assert_eq!(frozen.resolve_analyzer("beer", "style")?, vec!["keyword"]);
    assert_eq!(frozen.resolve_analyzer("brewery", "description")?, vec!["en"]);

    Ok(())
}

#[test]
fn test_unmapped_field_uses_default_analyzer() -> Result<()> {
    let frozen = frozen_beer_mapping()?;

    let fields = frozen.resolve_field("beer", "abv")?;
    assert_eq!(fields.len(), 1);
    assert!(fields[0].dynamic);
    assert_eq!(fields[0].analyzer.as_deref(), Some("en"));

    // unknown types fall back to the default mapping
    assert_eq!(frozen.resolve_analyzer("wine", "name")?, vec!["en"]);

    Ok(())
}

#[test]
fn test_description_mappings_coexist() -> Result<()> {
    let frozen = frozen_beer_mapping()?;

    let fields = frozen.resolve_field("beer", "description")?;
    let summary: Vec<(&str, Option<&str>)> = fields
        .iter()
        .map(|f| (f.field_name.as_str(), f.analyzer.as_deref()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("description", Some("enNotTooLong")),
            ("descriptionLang", Some("ascii_lang"))
        ]
    );
    assert!(!fields[1].store && !fields[1].include_in_all && !fields[1].include_term_vectors);

    let doc = json!({
        "type": "beer",
        "name": "Hoppiest Stouts",
        "description": "The Hoppiness of Brewing",
        "style": "American-Style Stout",
        "abv": 6.2
    });
    let analyzed = frozen.analyze_document(&doc)?;
    assert_eq!(analyzed.type_name, "beer");

    let description = analyzed.fields_named("description").next().unwrap();
    assert_eq!(terms(&description.tokens), vec!["hoppi", "brewi"]);
    assert!(description.stored.is_some());

    let lang = analyzed.fields_named("descriptionLang").next().unwrap();
    assert_eq!(terms(&lang.tokens), vec!["en"]);
    assert!(lang.stored.is_none());

    let name = analyzed.fields_named("name").next().unwrap();
    assert_eq!(terms(&name.tokens), vec!["hoppiest", "stout"]);

    let style = analyzed.fields_named("style").next().unwrap();
    assert_eq!(terms(&style.tokens), vec!["American-Style Stout"]);

    let composite = analyzed.composite.as_ref().unwrap();
    assert!(!terms(&composite.tokens).contains(&"en"));
    assert!(terms(&composite.tokens).contains(&"brewi"));

    Ok(())
}

#[test]
fn test_unregistered_analyzer_fails_freeze() -> Result<()> {
    let mapping = build_index_mapping("ascii_lang")?;

    match mapping.freeze() {
        Err(PaviseError::Configuration(issues)) => {
            assert_eq!(issues.len(), 1);
            assert_eq!(issues.issues()[0].subject, "type 'beer' field 'description'");
            assert!(issues.issues()[0].message.contains("ascii_lang"));
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }

    Ok(())
}

#[test]
fn test_builtin_detect_lang_tags_description() -> Result<()> {
    let frozen = build_index_mapping("detect_lang")?.freeze()?;

    let doc = json!({
        "type": "beer",
        "name": "Harvest Amber",
        "description": "This amber ale is brewed with caramel malt and finished with a generous \
                        addition of citrus hops, which gives it a bright and refreshing bitterness."
    });
    let analyzed = frozen.analyze_document(&doc)?;

    let lang = analyzed.fields_named("descriptionLang").next().unwrap();
    assert_eq!(lang.analyzer.as_deref(), Some("detect_lang"));
    assert_eq!(terms(&lang.tokens), vec!["eng"]);
    assert!(analyzed.fields_named("description").next().unwrap().tokens.len() > 1);

    Ok(())
}

#[test]
fn test_freeze_is_idempotent() -> Result<()> {
    let mut mapping = build_index_mapping("ascii_lang")?;
    register_ascii_lang(&mut mapping)?;

    let first = mapping.freeze()?;
    let second = mapping.freeze()?;
    assert_eq!(first, second);
    assert!(first.mapping().registry().is_closed());

    Ok(())
}

#[test]
fn test_frozen_registry_rejects_registration() -> Result<()> {
    let frozen = frozen_beer_mapping()?;
    let mut registry = frozen.mapping().registry().clone();

    let err = registry
        .register_analyzer("late", |_, _, _| Err(PaviseError::other("unused")))
        .unwrap_err();
    assert!(matches!(err, PaviseError::InvalidOperation(_)));

    Ok(())
}

#[test]
fn test_parallel_document_analysis() -> Result<()> {
    let frozen = frozen_beer_mapping()?;

    let docs: Vec<_> = (0..64)
        .map(|i| {
            if i % 2 == 0 {
                json!({"type": "beer", "name": format!("Stouts {i}"), "description": "Brewing"})
            } else {
                json!({"type": "brewery", "name": "Brewers Hall", "city": "Portland"})
            }
        })
        .collect();

    let analyzed = docs
        .par_iter()
        .map(|doc| frozen.analyze_document(doc))
        .collect::<Result<Vec<_>>>()?;

    assert_eq!(analyzed.len(), 64);
    for (i, doc) in analyzed.iter().enumerate() {
        let name = doc.fields_named("name").next().unwrap();
        if i % 2 == 0 {
            assert_eq!(doc.type_name, "beer");
            assert_eq!(terms(&name.tokens)[0], "stout");
        } else {
            assert_eq!(doc.type_name, "brewery");
            assert_eq!(terms(&name.tokens), vec!["brewer", "hall"]);
        }
    }

    Ok(())
}
