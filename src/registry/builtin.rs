//! Built-in components available in every default registry.
//!
//! | Kind | Name | Params |
//! |---|---|---|
//! | tokenizer | `unicode` | |
//! | tokenizer | `whitespace` | |
//! | tokenizer | `regexp` | `regexp` (required), `gaps` |
//! | tokenizer | `single` | |
//! | char filter | `regexp` | `regexp` (required), `replace` |
//! | char filter | `html` | |
//! | token filter | `to_lower` | |
//! | token filter | `truncate_token` | `length` (required) |
//! | token filter | `possessive_en` | |
//! | token filter | `stop_en` | |
//! | token filter | `stop_tokens` | `stop_words` (required) |
//! | token filter | `stemmer_porter` | |
//! | token filter | `length` | `min`, `max` |
//! | token filter | `limit` | `limit` (required) |
//! | analyzer | `standard`, `simple`, `keyword`, `en`, `detect_lang` | |
//! | analyzer | `custom` | `tokenizer` (required), `char_filters`, `token_filters` |

use std::sync::Arc;

use crate::analysis::analyzer::Analyzer;
use crate::analysis::analyzer::detect_lang::DetectLangAnalyzer;
use crate::analysis::analyzer::english::EnglishAnalyzer;
use crate::analysis::analyzer::keyword::KeywordAnalyzer;
use crate::analysis::analyzer::simple::SimpleAnalyzer;
use crate::analysis::analyzer::standard::StandardAnalyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::char_filter::html::HtmlCharFilter;
use crate::analysis::char_filter::pattern_replace::PatternReplaceCharFilter;
use crate::analysis::token_filter::Filter;
use crate::analysis::token_filter::length::LengthFilter;
use crate::analysis::token_filter::limit::LimitFilter;
use crate::analysis::token_filter::lowercase::LowercaseFilter;
use crate::analysis::token_filter::possessive::PossessiveFilter;
use crate::analysis::token_filter::stem::StemFilter;
use crate::analysis::token_filter::stop::StopFilter;
use crate::analysis::token_filter::truncate::TruncateFilter;
use crate::analysis::tokenizer::Tokenizer;
use crate::analysis::tokenizer::regex::RegexTokenizer;
use crate::analysis::tokenizer::unicode_word::UnicodeWordTokenizer;
use crate::analysis::tokenizer::whitespace::WhitespaceTokenizer;
use crate::analysis::tokenizer::single::SingleTokenizer;
use crate::error::{PaviseError, Result};
use crate::registry::builder::AnalyzerDefinition;
use crate::registry::{ComponentConstructor, ComponentParams, ComponentRegistry};

/// Shared instance for components that take no params.
fn shared_tokenizer(tokenizer: Arc<dyn Tokenizer>) -> ComponentConstructor {
    ComponentConstructor::tokenizer(move |_| Ok(Arc::clone(&tokenizer)))
}

fn shared_filter(filter: Arc<dyn Filter>) -> ComponentConstructor {
    ComponentConstructor::token_filter(move |_| Ok(Arc::clone(&filter)))
}

fn shared_analyzer(analyzer: Arc<dyn Analyzer>) -> ComponentConstructor {
    ComponentConstructor::analyzer(move |_, _, _| Ok(Arc::clone(&analyzer)))
}

fn regexp_tokenizer(params: &ComponentParams) -> Result<Arc<dyn Tokenizer>> {
    let pattern = params.require_str("regexp")?;
    let tokenizer = if params.get_bool("gaps")?.unwrap_or(false) {
        RegexTokenizer::with_gaps(pattern)?
    } else {
        RegexTokenizer::with_pattern(pattern)?
    };
    Ok(Arc::new(tokenizer))
}

fn regexp_char_filter(params: &ComponentParams) -> Result<Arc<dyn CharFilter>> {
    let pattern = params.require_str("regexp")?;
    let replacement = params.get_str("replace").unwrap_or("");
    Ok(Arc::new(PatternReplaceCharFilter::new(pattern, replacement)?))
}

fn html_char_filter(_params: &ComponentParams) -> Result<Arc<dyn CharFilter>> {
    Ok(Arc::new(HtmlCharFilter::new()?))
}

fn truncate_filter(params: &ComponentParams) -> Result<Arc<dyn Filter>> {
    Ok(Arc::new(TruncateFilter::new(params.require_usize("length")?)?))
}

fn stop_tokens_filter(params: &ComponentParams) -> Result<Arc<dyn Filter>> {
    let words = params.get_str_list("stop_words")?.ok_or_else(|| {
        PaviseError::invalid_config("missing required parameter 'stop_words'")
    })?;
    Ok(Arc::new(StopFilter::from_words(words)))
}

fn length_filter(params: &ComponentParams) -> Result<Arc<dyn Filter>> {
    let min = params.get_usize("min")?.unwrap_or(0);
    let max = params.get_usize("max")?;
    Ok(Arc::new(LengthFilter::new(min, max)?))
}

fn limit_filter(params: &ComponentParams) -> Result<Arc<dyn Filter>> {
    Ok(Arc::new(LimitFilter::new(params.require_usize("limit")?)))
}

pub(crate) fn register_builtins(registry: &mut ComponentRegistry) {
    registry.insert_builtin("unicode", shared_tokenizer(Arc::new(UnicodeWordTokenizer::new())));
    registry.insert_builtin("whitespace", shared_tokenizer(Arc::new(WhitespaceTokenizer::new())));
    registry.insert_builtin("single", shared_tokenizer(Arc::new(SingleTokenizer::new())));
    registry.insert_builtin("regexp", ComponentConstructor::tokenizer(regexp_tokenizer));

    registry.insert_builtin("regexp", ComponentConstructor::char_filter(regexp_char_filter));
    registry.insert_builtin("html", ComponentConstructor::char_filter(html_char_filter));

    registry.insert_builtin("to_lower", shared_filter(Arc::new(LowercaseFilter::new())));
    registry.insert_builtin("possessive_en", shared_filter(Arc::new(PossessiveFilter::new())));
    registry.insert_builtin("stop_en", shared_filter(Arc::new(StopFilter::new())));
    registry.insert_builtin("stemmer_porter", shared_filter(Arc::new(StemFilter::new())));
    registry.insert_builtin("truncate_token", ComponentConstructor::token_filter(truncate_filter));
    registry.insert_builtin("stop_tokens", ComponentConstructor::token_filter(stop_tokens_filter));
    registry.insert_builtin("length", ComponentConstructor::token_filter(length_filter));
    registry.insert_builtin("limit", ComponentConstructor::token_filter(limit_filter));

    registry.insert_builtin("standard", shared_analyzer(Arc::new(StandardAnalyzer::new())));
    registry.insert_builtin("simple", shared_analyzer(Arc::new(SimpleAnalyzer::new())));
    registry.insert_builtin("keyword", shared_analyzer(Arc::new(KeywordAnalyzer::new())));
    registry.insert_builtin("en", shared_analyzer(Arc::new(EnglishAnalyzer::new())));
    registry.insert_builtin("detect_lang", shared_analyzer(Arc::new(DetectLangAnalyzer::new())));
    registry.insert_builtin(
        "custom",
        ComponentConstructor::analyzer(|name, params, cache| {
            let definition = AnalyzerDefinition::from_params(name, params)?;
            let analyzer: Arc<dyn Analyzer> = Arc::new(cache.build(&definition)?);
            Ok(analyzer)
        }),
    );
}
