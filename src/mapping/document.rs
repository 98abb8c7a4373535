//! Per-type document mapping trees.
//!
//! A [`DocumentMapping`] is a tree keyed by path segment. Each node may hold
//! field mappings for the value at its path, a default analyzer inherited by
//! everything below it, and `enabled`/`dynamic` switches.
//!
//! Nodes live in an arena (`Vec<MappingNode>`) and refer to their parent and
//! children by index. A child is always created after its parent, so the tree
//! cannot contain cycles, and grafting a subtree copies it into the arena.

use std::collections::BTreeMap;

use crate::config::DocumentMappingConfig;
use crate::error::{PaviseError, Result};
use crate::mapping::field::FieldMapping;
use crate::mapping::{PATH_SEPARATOR, split_path};

/// Index of a node in a [`DocumentMapping`] arena.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// One node of a document mapping tree.
#[derive(Clone, Debug, PartialEq)]
pub struct MappingNode {
    name: String,
    parent: Option<NodeId>,
    children: BTreeMap<String, NodeId>,
    fields: Vec<FieldMapping>,
    enabled: bool,
    dynamic: bool,
    default_analyzer: Option<String>,
}

impl MappingNode {
    fn new(name: &str, parent: Option<NodeId>) -> Self {
        MappingNode {
            name: name.to_string(),
            parent,
            children: BTreeMap::new(),
            fields: Vec::new(),
            enabled: true,
            dynamic: true,
            default_analyzer: None,
        }
    }

    /// Copy of this node's own settings, detached from any tree.
    fn detached(&self, name: &str, parent: Option<NodeId>) -> Self {
        MappingNode {
            name: name.to_string(),
            parent,
            children: BTreeMap::new(),
            fields: self.fields.clone(),
            enabled: self.enabled,
            dynamic: self.dynamic,
            default_analyzer: self.default_analyzer.clone(),
        }
    }

    /// Path segment of this node; empty for the root.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[FieldMapping] {
        &self.fields
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn default_analyzer(&self) -> Option<&str> {
        self.default_analyzer.as_deref()
    }

    /// Names of the child nodes, sorted.
    pub fn child_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.children.keys().map(String::as_str)
    }
}

/// Mapping tree for one document type.
///
/// # Examples
///
/// ```
/// use pavise::mapping::document::DocumentMapping;
/// use pavise::mapping::field::FieldMapping;
///
/// let mut beer = DocumentMapping::new();
/// beer.add_field_mappings_at(
///     "name",
///     [FieldMapping::new_text_field_mapping().with_analyzer("en")],
/// ).unwrap();
///
/// assert_eq!(beer.field_mappings_at("name").len(), 1);
/// assert!(beer.field_mappings_at("abv").is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct DocumentMapping {
    nodes: Vec<MappingNode>,
}

impl DocumentMapping {
    /// Create an enabled, dynamic mapping with no fields.
    pub fn new() -> Self {
        DocumentMapping {
            nodes: vec![MappingNode::new("", None)],
        }
    }

    fn root(&self) -> &MappingNode {
        &self.nodes[ROOT]
    }

    fn root_mut(&mut self) -> &mut MappingNode {
        &mut self.nodes[ROOT]
    }

    /// Default analyzer for everything in this mapping.
    pub fn default_analyzer(&self) -> Option<&str> {
        self.root().default_analyzer()
    }

    pub fn set_default_analyzer<S: Into<String>>(&mut self, analyzer: S) {
        self.root_mut().default_analyzer = Some(analyzer.into());
    }

    pub fn with_default_analyzer<S: Into<String>>(mut self, analyzer: S) -> Self {
        self.set_default_analyzer(analyzer);
        self
    }

    /// Whether documents of this type are indexed at all.
    pub fn enabled(&self) -> bool {
        self.root().enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.root_mut().enabled = enabled;
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.set_enabled(enabled);
        self
    }

    /// Whether unmapped fields are indexed with the inherited default analyzer.
    pub fn dynamic(&self) -> bool {
        self.root().dynamic
    }

    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.root_mut().dynamic = dynamic;
    }

    pub fn with_dynamic(mut self, dynamic: bool) -> Self {
        self.set_dynamic(dynamic);
        self
    }

    fn segments(path: &str) -> Result<Vec<&str>> {
        split_path(path)
            .ok_or_else(|| PaviseError::invalid_argument(format!("invalid field path '{path}'")))
    }

    fn push_node(&mut self, node: MappingNode) -> NodeId {
        let id = self.nodes.len();
        if let Some(parent) = node.parent {
            self.nodes[parent].children.insert(node.name.clone(), id);
        }
        self.nodes.push(node);
        id
    }

    /// Node for `segments`, creating missing nodes on the way.
    fn ensure_path(&mut self, segments: &[&str]) -> NodeId {
        let mut current = ROOT;
        for segment in segments {
            current = match self.nodes[current].children.get(*segment) {
                Some(&child) => child,
                None => self.push_node(MappingNode::new(segment, Some(current))),
            };
        }
        current
    }

    fn find(&self, path: &str) -> Option<NodeId> {
        let segments = split_path(path)?;
        let mut current = ROOT;
        for segment in segments {
            current = *self.nodes[current].children.get(segment)?;
        }
        Some(current)
    }

    /// Nodes from the root down to the deepest existing node on `path`.
    fn trail(&self, path: &str) -> Vec<NodeId> {
        let mut trail = vec![ROOT];
        let mut current = ROOT;
        for segment in path.split(PATH_SEPARATOR) {
            match self.nodes[current].children.get(segment) {
                Some(&child) => {
                    trail.push(child);
                    current = child;
                }
                None => break,
            }
        }
        trail
    }

    /// Set the field mappings at `path`, replacing any already there.
    ///
    /// Intermediate nodes are created as needed.
    pub fn add_field_mappings_at<I>(&mut self, path: &str, mappings: I) -> Result<()>
    where
        I: IntoIterator<Item = FieldMapping>,
    {
        let segments = Self::segments(path)?;
        let node = self.ensure_path(&segments);
        self.nodes[node].fields = mappings.into_iter().collect();
        Ok(())
    }

    /// Append one field mapping at `path`.
    pub fn add_field_mapping_at(&mut self, path: &str, mapping: FieldMapping) -> Result<()> {
        let segments = Self::segments(path)?;
        let node = self.ensure_path(&segments);
        self.nodes[node].fields.push(mapping);
        Ok(())
    }

    /// Graft `mapping` at `path`, replacing whatever subtree was there.
    pub fn add_sub_document_mapping(&mut self, path: &str, mapping: DocumentMapping) -> Result<()> {
        let segments = Self::segments(path)?;
        let target = self.ensure_path(&segments);
        let replaced = !self.nodes[target].children.is_empty();

        let name = self.nodes[target].name.clone();
        let parent = self.nodes[target].parent;
        self.nodes[target] = mapping.root().detached(&name, parent);
        self.copy_children(&mapping, ROOT, target);

        if replaced {
            self.prune();
        }
        Ok(())
    }

    fn copy_children(&mut self, source: &DocumentMapping, from: NodeId, to: NodeId) {
        for (name, &child) in &source.nodes[from].children {
            let copied = self.push_node(source.nodes[child].detached(name, Some(to)));
            self.copy_children(source, child, copied);
        }
    }

    /// Drop nodes no longer reachable from the root.
    fn prune(&mut self) {
        let mut compacted = DocumentMapping {
            nodes: vec![self.root().detached("", None)],
        };
        compacted.copy_children(self, ROOT, ROOT);
        *self = compacted;
    }

    /// The node at `path`, if one exists.
    pub fn node_at(&self, path: &str) -> Option<&MappingNode> {
        self.find(path).map(|id| &self.nodes[id])
    }

    /// The field mappings at `path`; empty if the path is unmapped.
    pub fn field_mappings_at(&self, path: &str) -> &[FieldMapping] {
        self.node_at(path).map(MappingNode::fields).unwrap_or(&[])
    }

    /// The nearest default analyzer on the way from the root to `path`.
    ///
    /// The node at `path` itself counts, so a default analyzer set on a
    /// sub-document applies to its own fields.
    pub fn default_analyzer_for(&self, path: &str) -> Option<&str> {
        self.trail(path)
            .into_iter()
            .rev()
            .find_map(|id| self.nodes[id].default_analyzer())
    }

    /// False if any node between the root and `path` is disabled.
    pub fn is_enabled_at(&self, path: &str) -> bool {
        self.trail(path).into_iter().all(|id| self.nodes[id].enabled)
    }

    /// The `dynamic` switch of the deepest node enclosing `path`.
    pub fn is_dynamic_at(&self, path: &str) -> bool {
        self.trail(path)
            .last()
            .map(|&id| self.nodes[id].dynamic)
            .unwrap_or(true)
    }

    /// Every field mapping in the tree with its path, in path order.
    pub fn walk_field_mappings(&self) -> Vec<(String, &FieldMapping)> {
        let mut out = Vec::new();
        self.walk(ROOT, String::new(), &mut |path, node| {
            for field in &node.fields {
                out.push((path.to_string(), field));
            }
        });
        out
    }

    /// Every node that declares a default analyzer, with its path. The root
    /// has the empty path.
    pub fn default_analyzers(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        self.walk(ROOT, String::new(), &mut |path, node| {
            if let Some(analyzer) = node.default_analyzer() {
                out.push((path.to_string(), analyzer));
            }
        });
        out
    }

    fn walk<'s, F>(&'s self, id: NodeId, path: String, visit: &mut F)
    where
        F: FnMut(&str, &'s MappingNode),
    {
        let node = &self.nodes[id];
        visit(&path, node);
        for (name, &child) in &node.children {
            let child_path = if path.is_empty() {
                name.clone()
            } else {
                format!("{path}{PATH_SEPARATOR}{name}")
            };
            self.walk(child, child_path, visit);
        }
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Build a mapping from its configuration form.
    pub fn from_config(config: &DocumentMappingConfig) -> Result<Self> {
        let mut mapping = DocumentMapping::new();
        mapping.apply_config(ROOT, config)?;
        Ok(mapping)
    }

    fn apply_config(&mut self, id: NodeId, config: &DocumentMappingConfig) -> Result<()> {
        let node = &mut self.nodes[id];
        node.enabled = config.enabled;
        node.dynamic = config.dynamic;
        node.default_analyzer = config.default_analyzer.clone();
        node.fields = config.fields.clone();

        for (name, child_config) in &config.properties {
            if name.is_empty() || name.contains(PATH_SEPARATOR) {
                return Err(PaviseError::invalid_config(format!(
                    "property name '{name}' must be a single non-empty path segment"
                )));
            }
            let child = self.push_node(MappingNode::new(name, Some(id)));
            self.apply_config(child, child_config)?;
        }
        Ok(())
    }

    /// The configuration form of this mapping.
    pub fn to_config(&self) -> DocumentMappingConfig {
        self.node_config(ROOT)
    }

    fn node_config(&self, id: NodeId) -> DocumentMappingConfig {
        let node = &self.nodes[id];
        DocumentMappingConfig {
            enabled: node.enabled,
            dynamic: node.dynamic,
            default_analyzer: node.default_analyzer.clone(),
            fields: node.fields.clone(),
            properties: node
                .children
                .iter()
                .map(|(name, &child)| (name.clone(), self.node_config(child)))
                .collect(),
        }
    }
}

impl Default for DocumentMapping {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for DocumentMapping {
    fn eq(&self, other: &Self) -> bool {
        self.to_config() == other.to_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(analyzer: &str) -> FieldMapping {
        FieldMapping::new_text_field_mapping().with_analyzer(analyzer)
    }

    #[test]
    fn test_add_field_mappings_creates_intermediate_nodes() {
        let mut mapping = DocumentMapping::new();
        mapping
            .add_field_mappings_at("address.city", [text("keyword")])
            .unwrap();

        assert!(mapping.node_at("address").is_some());
        assert!(mapping.field_mappings_at("address").is_empty());
        assert_eq!(mapping.field_mappings_at("address.city").len(), 1);
        assert_eq!(mapping.node_count(), 3);
    }

    #[test]
    fn test_add_field_mappings_overwrites() {
        let mut mapping = DocumentMapping::new();
        mapping.add_field_mappings_at("name", [text("en")]).unwrap();
        mapping
            .add_field_mappings_at("name", [text("keyword"), text("standard")])
            .unwrap();

        let analyzers: Vec<_> = mapping
            .field_mappings_at("name")
            .iter()
            .map(|f| f.analyzer.as_deref().unwrap())
            .collect();
        assert_eq!(analyzers, vec!["keyword", "standard"]);

        mapping.add_field_mapping_at("name", text("en")).unwrap();
        assert_eq!(mapping.field_mappings_at("name").len(), 3);
    }

    #[test]
    fn test_invalid_paths_rejected() {
        let mut mapping = DocumentMapping::new();
        assert!(mapping.add_field_mappings_at("", [text("en")]).is_err());
        assert!(mapping.add_field_mappings_at("a..b", [text("en")]).is_err());
        assert!(mapping.add_field_mapping_at(".a", text("en")).is_err());
    }

    #[test]
    fn test_default_analyzer_nearest_ancestor() {
        let mut address = DocumentMapping::new().with_default_analyzer("keyword");
        address
            .add_field_mappings_at("city", [FieldMapping::new_text_field_mapping()])
            .unwrap();

        let mut brewery = DocumentMapping::new().with_default_analyzer("en");
        brewery.add_sub_document_mapping("address", address).unwrap();

        assert_eq!(brewery.default_analyzer_for("name"), Some("en"));
        assert_eq!(brewery.default_analyzer_for("address"), Some("keyword"));
        assert_eq!(brewery.default_analyzer_for("address.city"), Some("keyword"));
        assert_eq!(brewery.default_analyzer_for("address.geo.lat"), Some("keyword"));
        assert_eq!(DocumentMapping::new().default_analyzer_for("name"), None);
    }

    #[test]
    fn test_sub_document_replaces_subtree() {
        let mut mapping = DocumentMapping::new();
        mapping
            .add_field_mappings_at("meta.old.field", [text("en")])
            .unwrap();

        let mut replacement = DocumentMapping::new();
        replacement
            .add_field_mappings_at("fresh", [text("keyword")])
            .unwrap();
        mapping.add_sub_document_mapping("meta", replacement).unwrap();

        assert!(mapping.node_at("meta.old").is_none());
        assert_eq!(mapping.field_mappings_at("meta.fresh").len(), 1);
        // root, meta, fresh
        assert_eq!(mapping.node_count(), 3);
    }

    #[test]
    fn test_enabled_and_dynamic_switches() {
        let internal = DocumentMapping::new().with_enabled(false);
        let strict = DocumentMapping::new().with_dynamic(false);

        let mut mapping = DocumentMapping::new();
        mapping.add_sub_document_mapping("internal", internal).unwrap();
        mapping.add_sub_document_mapping("strict", strict).unwrap();

        assert!(mapping.is_enabled_at("name"));
        assert!(!mapping.is_enabled_at("internal.secret"));
        assert!(mapping.is_dynamic_at("anything"));
        assert!(!mapping.is_dynamic_at("strict.extra"));
    }

    #[test]
    fn test_walk_field_mappings_in_path_order() {
        let mut mapping = DocumentMapping::new();
        mapping.add_field_mappings_at("style", [text("keyword")]).unwrap();
        mapping
            .add_field_mappings_at("description", [text("enNotTooLong"), text("detect_lang")])
            .unwrap();
        mapping.add_field_mappings_at("name", [text("en")]).unwrap();

        let paths: Vec<String> = mapping
            .walk_field_mappings()
            .into_iter()
            .map(|(path, _)| path)
            .collect();
        assert_eq!(paths, vec!["description", "description", "name", "style"]);
    }

    #[test]
    fn test_config_round_trip() {
        let mut mapping = DocumentMapping::new().with_default_analyzer("en");
        mapping
            .add_field_mappings_at("brewery.address.city", [text("keyword")])
            .unwrap();
        mapping.add_field_mappings_at("name", [text("en")]).unwrap();

        let config = mapping.to_config();
        assert_eq!(config.properties["brewery"].properties["address"].properties.len(), 1);

        let rebuilt = DocumentMapping::from_config(&config).unwrap();
        assert_eq!(rebuilt, mapping);
    }

    #[test]
    fn test_config_rejects_dotted_property() {
        let mut config = DocumentMappingConfig::default();
        config
            .properties
            .insert("a.b".to_string(), DocumentMappingConfig::default());

        assert!(DocumentMapping::from_config(&config).is_err());
    }
}
