//! Index field mappings.
//!
//! A mapping says, for each document type, which fields are indexed and with
//! which analyzer. Mappings are built mutably through [`index::IndexMapping`],
//! validated once by [`index::IndexMapping::freeze`], and then shared
//! read-only as a [`frozen::FrozenIndexMapping`].
//!
//! # Modules
//!
//! - [`field`] - Leaf field mappings
//! - [`document`] - Per-type mapping trees
//! - [`index`] - The index-wide mapping and its custom analysis components
//! - [`resolver`] - Analyzer resolution for a type and field path
//! - [`frozen`] - The validated mapping and document analysis

pub mod document;
pub mod field;
pub mod frozen;
pub mod index;
pub mod resolver;

/// Separator between segments of a field path.
pub const PATH_SEPARATOR: char = '.';

/// Split a dotted field path into its segments.
///
/// Returns `None` if the path is empty or has an empty segment.
pub(crate) fn split_path(path: &str) -> Option<Vec<&str>> {
    let segments: Vec<&str> = path.split(PATH_SEPARATOR).collect();
    if segments.iter().any(|s| s.is_empty()) {
        None
    } else {
        Some(segments)
    }
}

/// Check that a name is usable as an indexed field name.
pub(crate) fn validate_field_name(name: &str) -> std::result::Result<(), String> {
    if name.is_empty() {
        return Err("field name is empty".to_string());
    }
    if name.chars().any(char::is_whitespace) {
        return Err(format!("field name '{name}' contains whitespace"));
    }
    if split_path(name).is_none() {
        return Err(format!("field name '{name}' has an empty path segment"));
    }
    Ok(())
}
