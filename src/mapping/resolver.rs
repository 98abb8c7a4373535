//! Analyzer resolution for a document type and field path.
//!
//! Every field mapping at a path yields one [`ResolvedField`]; mappings at the
//! same path coexist rather than override each other. The analyzer of a text
//! field is, in order of preference:
//!
//! 1. the analyzer set on the field mapping,
//! 2. the default analyzer of the nearest enclosing document mapping,
//! 3. the index-wide default analyzer.
//!
//! A path with no field mappings resolves to a single dynamic entry using the
//! same chain.

use serde::Serialize;

use crate::error::{PaviseError, Result};
use crate::mapping::field::{FieldMapping, FieldType};
use crate::mapping::index::IndexMapping;
use crate::mapping::split_path;

/// The outcome of resolving one field mapping at a path.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ResolvedField {
    /// The document path that was resolved
    pub path: String,
    /// The name the field is indexed under
    pub field_name: String,
    pub field_type: FieldType,
    /// Analyzer for text fields; `None` for other types
    pub analyzer: Option<String>,
    pub store: bool,
    pub index: bool,
    pub include_in_all: bool,
    pub include_term_vectors: bool,
    /// True if no field mapping exists at the path
    pub dynamic: bool,
}

/// Resolves analyzers against an [`IndexMapping`].
#[derive(Clone, Copy, Debug)]
pub struct MappingResolver<'a> {
    mapping: &'a IndexMapping,
}

impl<'a> MappingResolver<'a> {
    pub fn new(mapping: &'a IndexMapping) -> Self {
        MappingResolver { mapping }
    }

    /// The analyzer inherited at `path` when a field does not name one.
    pub fn inherited_analyzer(&self, type_name: &str, path: &str) -> Option<&'a str> {
        self.mapping
            .mapping_for_type(type_name)
            .default_analyzer_for(path)
            .or_else(|| Some(self.mapping.default_analyzer.as_str()).filter(|a| !a.is_empty()))
    }

    /// Resolve every field mapping that applies to `path` in `type_name`.
    pub fn resolve_field(&self, type_name: &str, path: &str) -> Result<Vec<ResolvedField>> {
        if split_path(path).is_none() {
            return Err(PaviseError::invalid_argument(format!(
                "invalid field path '{path}'"
            )));
        }

        let document = self.mapping.mapping_for_type(type_name);
        let fields = document.field_mappings_at(path);

        if fields.is_empty() {
            let analyzer = self
                .inherited_analyzer(type_name, path)
                .ok_or_else(|| PaviseError::no_applicable_mapping(type_name, path))?;
            return Ok(vec![ResolvedField {
                path: path.to_string(),
                field_name: path.to_string(),
                field_type: FieldType::Text,
                analyzer: Some(analyzer.to_string()),
                store: self.mapping.store_dynamic,
                index: self.mapping.index_dynamic,
                include_in_all: true,
                include_term_vectors: true,
                dynamic: true,
            }]);
        }

        fields
            .iter()
            .map(|field| self.resolve_mapping(type_name, path, field))
            .collect()
    }

    fn resolve_mapping(
        &self,
        type_name: &str,
        path: &str,
        field: &FieldMapping,
    ) -> Result<ResolvedField> {
        let analyzer = if field.is_text() {
            let name = match &field.analyzer {
                Some(name) => name.as_str(),
                None => self
                    .inherited_analyzer(type_name, path)
                    .ok_or_else(|| PaviseError::no_applicable_mapping(type_name, path))?,
            };
            Some(name.to_string())
        } else {
            None
        };

        Ok(ResolvedField {
            path: path.to_string(),
            field_name: field.indexed_name(path),
            field_type: field.field_type,
            analyzer,
            store: field.store,
            index: field.index,
            include_in_all: field.include_in_all,
            include_term_vectors: field.include_term_vectors,
            dynamic: false,
        })
    }

    /// Names of the analyzers applied to `path`, one per text field mapping.
    pub fn resolve_analyzer(&self, type_name: &str, path: &str) -> Result<Vec<String>> {
        Ok(self
            .resolve_field(type_name, path)?
            .into_iter()
            .filter_map(|field| field.analyzer)
            .collect())
    }
}
