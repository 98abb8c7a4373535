//! Integration tests for the component registry and custom analyzers.

use std::sync::Arc;

use serde_json::json;

use pavise::analysis::analyzer::Analyzer;
use pavise::analysis::token_filter::Filter;
use pavise::analysis::token_filter::lowercase::LowercaseFilter;
use pavise::error::{PaviseError, Result};
use pavise::mapping::index::IndexMapping;
use pavise::registry::{ComponentConstructor, ComponentKind, ComponentRegistry};

#[test]
fn test_register_then_resolve_returns_same_constructor() -> Result<()> {
    let mut registry = ComponentRegistry::empty();
    let constructor = ComponentConstructor::token_filter(|_params| {
        let filter: Arc<dyn Filter> = Arc::new(LowercaseFilter::new());
        Ok(filter)
    });

    registry.register("shout_down", constructor.clone())?;

    let resolved = registry.resolve(ComponentKind::TokenFilter, "shout_down")?;
    assert!(resolved.ptr_eq(&constructor));
    assert!(registry.contains(ComponentKind::TokenFilter, "shout_down"));
    assert!(!registry.contains(ComponentKind::Analyzer, "shout_down"));

    Ok(())
}

#[test]
fn test_duplicate_registration_fails() -> Result<()> {
    let mut registry = ComponentRegistry::new();

    let err = registry
        .register_token_filter("to_lower", |_| {
            let filter: Arc<dyn Filter> = Arc::new(LowercaseFilter::new());
            Ok(filter)
        })
        .unwrap_err();

    match err {
        PaviseError::DuplicateName { kind, name } => {
            assert_eq!(kind, "token filter");
            assert_eq!(name, "to_lower");
        }
        other => panic!("unexpected error: {other}"),
    }

    Ok(())
}

#[test]
fn test_resolving_unknown_name_fails() -> Result<()> {
    let registry = ComponentRegistry::new();

    let err = registry.resolve_analyzer("klingon").err().unwrap();
    assert!(matches!(err, PaviseError::UnknownComponent { .. }));

    Ok(())
}

fn ordering_mapping() -> Result<IndexMapping> {
    IndexMapping::from_json(
        &json!({
            "analysis": {
                "token_filters": {
                    "firstChar": {"type": "truncate_token", "length": 1}
                },
                "analyzers": {
                    "truncateThenLower": {
                        "type": "custom",
                        "tokenizer": "whitespace",
                        "token_filters": ["firstChar", "to_lower"]
                    },
                    "lowerThenTruncate": {
                        "type": "custom",
                        "tokenizer": "whitespace",
                        "token_filters": ["to_lower", "firstChar"]
                    }
                }
            }
        })
        .to_string(),
    )
}

#[test]
fn test_token_filter_order_is_observable() -> Result<()> {
    let frozen = ordering_mapping()?.freeze()?;

    // Lowercasing "İ" yields two chars, so truncating after lowercasing
    // keeps only the first of them.
    let truncated_first = frozen.analyze_text("truncateThenLower", "İzmir")?;
    let lowered_first = frozen.analyze_text("lowerThenTruncate", "İzmir")?;

    assert_eq!(truncated_first[0].text, "i\u{307}");
    assert_eq!(lowered_first[0].text, "i");

    Ok(())
}

#[test]
fn test_custom_analyzer_with_char_filter() -> Result<()> {
    let mut mapping = IndexMapping::new();
    mapping.add_custom_char_filter(
        "dashes",
        json!({"type": "regexp", "regexp": "-", "replace": " "}),
    )?;
    mapping.add_custom_analyzer(
        "dashed",
        json!({
            "type": "custom",
            "tokenizer": "whitespace",
            "char_filters": ["html", "dashes"],
            "token_filters": ["to_lower"]
        }),
    )?;
    let frozen = mapping.freeze()?;

    let tokens = frozen.analyze_text("dashed", "<p>Double-IPA</p>")?;
    let terms: Vec<_> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(terms, vec!["double", "ipa"]);

    // offsets point back into the raw text
    assert_eq!(&"<p>Double-IPA</p>"[tokens[0].start_offset..tokens[0].end_offset], "Double");

    Ok(())
}

#[test]
fn test_custom_analyzer_with_unknown_filter_fails_freeze() -> Result<()> {
    let mut mapping = IndexMapping::new();
    mapping.add_custom_analyzer(
        "broken",
        json!({"type": "custom", "tokenizer": "unicode", "token_filters": ["elvish_stemmer"]}),
    )?;

    let err = mapping.freeze().unwrap_err();
    let issues = err.config_issues().unwrap();
    assert_eq!(issues[0].subject, "custom analyzer 'broken'");
    assert!(issues[0].message.contains("elvish_stemmer"));

    Ok(())
}

#[test]
fn test_builtin_analyzers_are_available_after_freeze() -> Result<()> {
    let frozen = IndexMapping::new().freeze()?;

    let standard = frozen.analyzer("standard")?;
    assert_eq!(standard.name(), "standard");
    let terms: Vec<_> = standard.analyze("The Pale Ale")?.map(|t| t.text).collect();
    assert_eq!(terms, vec!["pale", "ale"]);

    // only referenced analyzers are built
    assert!(frozen.analyzer("en").is_err());

    Ok(())
}
