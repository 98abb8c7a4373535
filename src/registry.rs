//! Component registry for analysis building blocks.
//!
//! The registry maps `(kind, name)` to a constructor. Constructors receive the
//! params of a component definition and return a ready-to-use component, so a
//! single registered type (for example `truncate_token`) can back any number of
//! differently configured custom components.
//!
//! The registry is write-once-then-read-many: components are registered at
//! startup, then the registry is closed when an index mapping is frozen and
//! further registration is rejected.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use pavise::analysis::analyzer::Analyzer;
//! use pavise::analysis::analyzer::keyword::KeywordAnalyzer;
//! use pavise::registry::ComponentRegistry;
//!
//! let mut registry = ComponentRegistry::new();
//! registry
//!     .register_analyzer("style_code", |_name, _params, _cache| {
//!         let analyzer: Arc<dyn Analyzer> = Arc::new(KeywordAnalyzer::new());
//!         Ok(analyzer)
//!     })
//!     .unwrap();
//!
//! assert!(registry.resolve_analyzer("style_code").is_ok());
//! assert!(registry.register_analyzer("style_code", |_, _, _| unreachable!()).is_err());
//! ```

use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::analysis::analyzer::Analyzer;
use crate::analysis::char_filter::CharFilter;
use crate::analysis::token_filter::Filter;
use crate::analysis::tokenizer::Tokenizer;
use crate::error::{PaviseError, Result};

pub mod builder;
pub mod builtin;

pub use builder::{AnalysisCache, AnalyzerDefinition, CustomAnalysis};

/// The kinds of component the registry can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Tokenizer,
    CharFilter,
    TokenFilter,
    Analyzer,
}

impl ComponentKind {
    /// All kinds, in resolution order.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::CharFilter,
        ComponentKind::Tokenizer,
        ComponentKind::TokenFilter,
        ComponentKind::Analyzer,
    ];

    /// Human readable name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Tokenizer => "tokenizer",
            ComponentKind::CharFilter => "char filter",
            ComponentKind::TokenFilter => "token filter",
            ComponentKind::Analyzer => "analyzer",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a component definition.
///
/// A thin wrapper over a JSON object with typed accessors. The `"type"` entry
/// names the registered constructor that builds the component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentParams(Map<String, Value>);

impl ComponentParams {
    /// Create empty params.
    pub fn new() -> Self {
        ComponentParams(Map::new())
    }

    /// Builder-style insert.
    pub fn with<K: Into<String>, V: Into<Value>>(mut self, key: K, value: V) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// The constructor type named by the `"type"` entry.
    pub fn component_type(&self) -> Option<&str> {
        self.get_str("type")
    }

    /// Get a raw value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Get a string value. Non-string values are treated as absent.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Get a required string value.
    pub fn require_str(&self, key: &str) -> Result<&str> {
        match self.0.get(key) {
            Some(Value::String(s)) => Ok(s),
            Some(other) => Err(PaviseError::invalid_config(format!(
                "parameter '{key}' must be a string, got {other}"
            ))),
            None => Err(PaviseError::invalid_config(format!(
                "missing required parameter '{key}'"
            ))),
        }
    }

    /// Get a non-negative integer value.
    ///
    /// JSON numbers with a zero fractional part (`5.0`) are accepted, since
    /// configuration written by other tools often stores every number as a
    /// float.
    pub fn get_usize(&self, key: &str) -> Result<Option<usize>> {
        let Some(value) = self.0.get(key) else {
            return Ok(None);
        };
        let invalid = || {
            PaviseError::invalid_config(format!(
                "parameter '{key}' must be a non-negative integer, got {value}"
            ))
        };
        if let Some(n) = value.as_u64() {
            return usize::try_from(n).map(Some).map_err(|_| invalid());
        }
        match value.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= usize::MAX as f64 => {
                Ok(Some(f as usize))
            }
            _ => Err(invalid()),
        }
    }

    /// Get a required non-negative integer value.
    pub fn require_usize(&self, key: &str) -> Result<usize> {
        self.get_usize(key)?.ok_or_else(|| {
            PaviseError::invalid_config(format!("missing required parameter '{key}'"))
        })
    }

    /// Get a boolean value.
    pub fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(PaviseError::invalid_config(format!(
                "parameter '{key}' must be a boolean, got {other}"
            ))),
        }
    }

    /// Get a list of strings. A single string is accepted as a one-element list.
    pub fn get_str_list(&self, key: &str) -> Result<Option<Vec<String>>> {
        match self.0.get(key) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(vec![s.clone()])),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        PaviseError::invalid_config(format!(
                            "parameter '{key}' must contain only strings, got {item}"
                        ))
                    })
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            Some(other) => Err(PaviseError::invalid_config(format!(
                "parameter '{key}' must be a list of strings, got {other}"
            ))),
        }
    }

    /// Access the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying JSON object.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for ComponentParams {
    fn from(map: Map<String, Value>) -> Self {
        ComponentParams(map)
    }
}

impl TryFrom<Value> for ComponentParams {
    type Error = PaviseError;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(ComponentParams(map)),
            other => Err(PaviseError::invalid_config(format!(
                "component definition must be a JSON object, got {other}"
            ))),
        }
    }
}

/// A named, parameterized component definition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComponentSpec {
    pub name: String,
    pub kind: ComponentKind,
    pub params: ComponentParams,
}

impl ComponentSpec {
    pub fn new<S: Into<String>>(name: S, kind: ComponentKind, params: ComponentParams) -> Self {
        ComponentSpec {
            name: name.into(),
            kind,
            params,
        }
    }
}

/// Builds a tokenizer from params.
pub type TokenizerConstructor =
    Arc<dyn Fn(&ComponentParams) -> Result<Arc<dyn Tokenizer>> + Send + Sync>;

/// Builds a char filter from params.
pub type CharFilterConstructor =
    Arc<dyn Fn(&ComponentParams) -> Result<Arc<dyn CharFilter>> + Send + Sync>;

/// Builds a token filter from params.
pub type TokenFilterConstructor =
    Arc<dyn Fn(&ComponentParams) -> Result<Arc<dyn Filter>> + Send + Sync>;

/// Builds an analyzer from its name and params.
///
/// Analyzer constructors also get the [`AnalysisCache`] so they can look up the
/// tokenizers and filters they are composed of.
pub type AnalyzerConstructor = Arc<
    dyn Fn(&str, &ComponentParams, &mut AnalysisCache<'_>) -> Result<Arc<dyn Analyzer>>
        + Send
        + Sync,
>;

/// A registered constructor of any kind.
#[derive(Clone)]
pub enum ComponentConstructor {
    Tokenizer(TokenizerConstructor),
    CharFilter(CharFilterConstructor),
    TokenFilter(TokenFilterConstructor),
    Analyzer(AnalyzerConstructor),
}

impl ComponentConstructor {
    /// Wrap a tokenizer constructor.
    pub fn tokenizer<F>(constructor: F) -> Self
    where
        F: Fn(&ComponentParams) -> Result<Arc<dyn Tokenizer>> + Send + Sync + 'static,
    {
        ComponentConstructor::Tokenizer(Arc::new(constructor))
    }

    /// Wrap a char filter constructor.
    pub fn char_filter<F>(constructor: F) -> Self
    where
        F: Fn(&ComponentParams) -> Result<Arc<dyn CharFilter>> + Send + Sync + 'static,
    {
        ComponentConstructor::CharFilter(Arc::new(constructor))
    }

    /// Wrap a token filter constructor.
    pub fn token_filter<F>(constructor: F) -> Self
    where
        F: Fn(&ComponentParams) -> Result<Arc<dyn Filter>> + Send + Sync + 'static,
    {
        ComponentConstructor::TokenFilter(Arc::new(constructor))
    }

    /// Wrap an analyzer constructor.
    pub fn analyzer<F>(constructor: F) -> Self
    where
        F: Fn(&str, &ComponentParams, &mut AnalysisCache<'_>) -> Result<Arc<dyn Analyzer>>
            + Send
            + Sync
            + 'static,
    {
        ComponentConstructor::Analyzer(Arc::new(constructor))
    }

    /// The kind of component this constructor builds.
    pub fn kind(&self) -> ComponentKind {
        match self {
            ComponentConstructor::Tokenizer(_) => ComponentKind::Tokenizer,
            ComponentConstructor::CharFilter(_) => ComponentKind::CharFilter,
            ComponentConstructor::TokenFilter(_) => ComponentKind::TokenFilter,
            ComponentConstructor::Analyzer(_) => ComponentKind::Analyzer,
        }
    }

    /// Check if two constructors are the same registered instance.
    pub fn ptr_eq(&self, other: &ComponentConstructor) -> bool {
        match (self, other) {
            (ComponentConstructor::Tokenizer(a), ComponentConstructor::Tokenizer(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ComponentConstructor::CharFilter(a), ComponentConstructor::CharFilter(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ComponentConstructor::TokenFilter(a), ComponentConstructor::TokenFilter(b)) => {
                Arc::ptr_eq(a, b)
            }
            (ComponentConstructor::Analyzer(a), ComponentConstructor::Analyzer(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ComponentConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentConstructor({})", self.kind())
    }
}

/// Registry of component constructors keyed by kind and name.
#[derive(Clone)]
pub struct ComponentRegistry {
    constructors: AHashMap<(ComponentKind, String), ComponentConstructor>,
    closed: bool,
}

impl ComponentRegistry {
    /// Create a registry holding every built-in component.
    pub fn new() -> Self {
        Self::with_builtins()
    }

    /// Create a registry holding every built-in component.
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        builtin::register_builtins(&mut registry);
        registry
    }

    /// Create a registry with nothing registered.
    pub fn empty() -> Self {
        ComponentRegistry {
            constructors: AHashMap::new(),
            closed: false,
        }
    }

    /// Register a constructor under `name` for the constructor's kind.
    pub fn register<S: Into<String>>(
        &mut self,
        name: S,
        constructor: ComponentConstructor,
    ) -> Result<()> {
        let name = name.into();
        let kind = constructor.kind();
        if self.closed {
            return Err(PaviseError::invalid_operation(format!(
                "cannot register {kind} '{name}': registry is closed"
            )));
        }
        let key = (kind, name);
        if self.constructors.contains_key(&key) {
            return Err(PaviseError::duplicate_name(kind, key.1));
        }
        debug!("registered {} '{}'", kind, key.1);
        self.constructors.insert(key, constructor);
        Ok(())
    }

    /// Register a tokenizer constructor.
    pub fn register_tokenizer<S, F>(&mut self, name: S, constructor: F) -> Result<()>
    where
        S: Into<String>,
        F: Fn(&ComponentParams) -> Result<Arc<dyn Tokenizer>> + Send + Sync + 'static,
    {
        self.register(name, ComponentConstructor::tokenizer(constructor))
    }

    /// Register a char filter constructor.
    pub fn register_char_filter<S, F>(&mut self, name: S, constructor: F) -> Result<()>
    where
        S: Into<String>,
        F: Fn(&ComponentParams) -> Result<Arc<dyn CharFilter>> + Send + Sync + 'static,
    {
        self.register(name, ComponentConstructor::char_filter(constructor))
    }

    /// Register a token filter constructor.
    pub fn register_token_filter<S, F>(&mut self, name: S, constructor: F) -> Result<()>
    where
        S: Into<String>,
        F: Fn(&ComponentParams) -> Result<Arc<dyn Filter>> + Send + Sync + 'static,
    {
        self.register(name, ComponentConstructor::token_filter(constructor))
    }

    /// Register an analyzer constructor.
    pub fn register_analyzer<S, F>(&mut self, name: S, constructor: F) -> Result<()>
    where
        S: Into<String>,
        F: Fn(&str, &ComponentParams, &mut AnalysisCache<'_>) -> Result<Arc<dyn Analyzer>>
            + Send
            + Sync
            + 'static,
    {
        self.register(name, ComponentConstructor::analyzer(constructor))
    }

    /// Insert a built-in. Built-in names are distinct so this cannot collide.
    pub(crate) fn insert_builtin(&mut self, name: &str, constructor: ComponentConstructor) {
        self.constructors
            .insert((constructor.kind(), name.to_string()), constructor);
    }

    /// Look up the constructor registered for `(kind, name)`.
    pub fn resolve(&self, kind: ComponentKind, name: &str) -> Result<ComponentConstructor> {
        self.constructors
            .get(&(kind, name.to_string()))
            .cloned()
            .ok_or_else(|| PaviseError::unknown_component(kind, name))
    }

    /// Look up a tokenizer constructor.
    pub fn resolve_tokenizer(&self, name: &str) -> Result<TokenizerConstructor> {
        match self.resolve(ComponentKind::Tokenizer, name)? {
            ComponentConstructor::Tokenizer(c) => Ok(c),
            _ => Err(PaviseError::unknown_component(ComponentKind::Tokenizer, name)),
        }
    }

    /// Look up a char filter constructor.
    pub fn resolve_char_filter(&self, name: &str) -> Result<CharFilterConstructor> {
        match self.resolve(ComponentKind::CharFilter, name)? {
            ComponentConstructor::CharFilter(c) => Ok(c),
            _ => Err(PaviseError::unknown_component(ComponentKind::CharFilter, name)),
        }
    }

    /// Look up a token filter constructor.
    pub fn resolve_token_filter(&self, name: &str) -> Result<TokenFilterConstructor> {
        match self.resolve(ComponentKind::TokenFilter, name)? {
            ComponentConstructor::TokenFilter(c) => Ok(c),
            _ => Err(PaviseError::unknown_component(ComponentKind::TokenFilter, name)),
        }
    }

    /// Look up an analyzer constructor.
    pub fn resolve_analyzer(&self, name: &str) -> Result<AnalyzerConstructor> {
        match self.resolve(ComponentKind::Analyzer, name)? {
            ComponentConstructor::Analyzer(c) => Ok(c),
            _ => Err(PaviseError::unknown_component(ComponentKind::Analyzer, name)),
        }
    }

    /// Check whether `(kind, name)` is registered.
    pub fn contains(&self, kind: ComponentKind, name: &str) -> bool {
        self.constructors.contains_key(&(kind, name.to_string()))
    }

    /// Registered names of one kind, sorted.
    pub fn names(&self, kind: ComponentKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .constructors
            .keys()
            .filter(|(k, _)| *k == kind)
            .map(|(_, name)| name.as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Number of registered constructors across all kinds.
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Reject all further registration.
    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl Default for ComponentRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.constructors.len())
            .field("closed", &self.closed)
            .finish()
    }
}
