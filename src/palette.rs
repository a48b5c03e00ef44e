//! Palette entries and the selected group
//!
//! Entries form a tree stored in an arena: each node owns an ordered list of
//! child ids, the palette owns the ordered list of top-level groups.
//! Navigation is always root to leaf, so nodes keep no parent link.

use crate::config::{ConfigError, ConfigStore};
use crate::constant::{DEFAULT_SELECTED_GROUP, SELECTED_GROUP_PATH};
use crate::icon::{CacheKey, IconError, IconPipeline};
use image::RgbaImage;
use std::collections::HashMap;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum PaletteError {
    #[error("Duplicate palette id: {0}")]
    DuplicateId(String),

    #[error("Unknown palette id: {0}")]
    UnknownId(String),

    #[error("Not a top-level group: {0}")]
    NotAGroup(String),

    #[error("Unknown palette node: {0:?}")]
    UnknownNode(NodeId),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Index of a node inside its [`Palette`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct IconAssetNode {
    pub id: String,
    pub display_name: String,
    pub source_icon_path: PathBuf,
    pub frame_path: PathBuf,
    children: Vec<NodeId>,
}

impl IconAssetNode {
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        source_icon_path: impl Into<PathBuf>,
        frame_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            source_icon_path: source_icon_path.into(),
            frame_path: frame_path.into(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

#[derive(Debug, Default)]
pub struct Palette {
    nodes: Vec<IconAssetNode>,
    roots: Vec<NodeId>,
    by_id: HashMap<String, NodeId>,
    selected: Option<NodeId>,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    /// The stock palette shipped with the application
    pub fn initial() -> Result<Self, PaletteError> {
        let mut palette = Self::new();
        let powders = palette.add_group(IconAssetNode::new(
            "powders",
            "Powders",
            "assets/palette/toplevel/powders.png",
            "assets/palette/toplevel/frame.png",
        ))?;
        palette.add_child(
            powders,
            IconAssetNode::new(
                "dust",
                "Dust",
                "assets/palette/powders/dust.png",
                "assets/palette/toplevel/frame.png",
            ),
        )?;
        Ok(palette)
    }

    fn insert(&mut self, node: IconAssetNode) -> Result<NodeId, PaletteError> {
        if self.by_id.contains_key(&node.id) {
            return Err(PaletteError::DuplicateId(node.id));
        }
        let id = NodeId(self.nodes.len());
        self.by_id.insert(node.id.clone(), id);
        self.nodes.push(node);
        Ok(id)
    }

    /// Append a top-level group
    pub fn add_group(&mut self, node: IconAssetNode) -> Result<NodeId, PaletteError> {
        let id = self.insert(node)?;
        self.roots.push(id);
        Ok(id)
    }

    /// Append `node` to the children of `parent`. A `parent` that does not
    /// belong to this palette is rejected before anything is inserted.
    pub fn add_child(&mut self, parent: NodeId, node: IconAssetNode) -> Result<NodeId, PaletteError> {
        if self.get(parent).is_none() {
            return Err(PaletteError::UnknownNode(parent));
        }
        let id = self.insert(node)?;
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn get(&self, id: NodeId) -> Option<&IconAssetNode> {
        self.nodes.get(id.0)
    }

    /// Panics if `id` came from another palette; see [`Palette::get`].
    pub fn node(&self, id: NodeId) -> &IconAssetNode {
        &self.nodes[id.0]
    }

    pub fn find(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn groups(&self) -> &[NodeId] {
        &self.roots
    }

    /// Panics if `id` came from another palette.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Every node, depth first, groups in insertion order
    pub fn iter_depth_first(&self) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Restore the selected group from settings. An unknown or missing
    /// id leaves nothing selected.
    pub fn restore_selection(&mut self, config: &ConfigStore) {
        let wanted = config.get_str(&SELECTED_GROUP_PATH, DEFAULT_SELECTED_GROUP);
        self.selected = self.find(&wanted).filter(|id| self.roots.contains(id));
    }

    /// Select a top-level group and remember the choice in settings
    pub fn select_group(&mut self, id: &str, config: &mut ConfigStore) -> Result<NodeId, PaletteError> {
        let node = self
            .find(id)
            .ok_or_else(|| PaletteError::UnknownId(id.to_string()))?;
        if !self.roots.contains(&node) {
            return Err(PaletteError::NotAGroup(id.to_string()));
        }
        self.selected = Some(node);
        config.set(id, &SELECTED_GROUP_PATH)?;
        info!("Selected palette group: {}", self.node(node).display_name);
        Ok(node)
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Cache key of a node under `pipeline`'s size and padding
    pub fn cache_key(&self, id: NodeId, pipeline: &IconPipeline) -> CacheKey {
        let node = self.node(id);
        pipeline.cache_key_for(&node.id, &node.source_icon_path, &node.frame_path)
    }

    /// Framed icon for a node, from cache when possible
    pub fn resolve_icon(&self, id: NodeId, pipeline: &IconPipeline) -> Result<RgbaImage, IconError> {
        let node = self.node(id);
        pipeline.resolve(
            &node.source_icon_path,
            &node.frame_path,
            &self.cache_key(id, pipeline),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigPaths;
    use std::fs;
    use std::path::Path;
    use uuid::Uuid;

    fn setup_test_config() -> (ConfigStore, PathBuf) {
        let test_dir = std::env::temp_dir().join(format!("test_palette_{}", Uuid::new_v4()));
        let paths = ConfigPaths::new(
            test_dir.join("settings.toml"),
            test_dir.join("default_settings.toml"),
        );
        (ConfigStore::open(paths).unwrap(), test_dir)
    }

    fn cleanup_test_dir(test_dir: &Path) {
        let _ = fs::remove_dir_all(test_dir);
    }

    fn leaf(id: &str) -> IconAssetNode {
        IconAssetNode::new(id, id.to_uppercase(), format!("{id}.png"), "frame.png")
    }

    #[test]
    fn test_initial_tree() {
        let palette = Palette::initial().unwrap();
        assert_eq!(palette.len(), 2);

        let powders = palette.find("powders").unwrap();
        assert_eq!(palette.groups(), &[powders]);
        let children = palette.children(powders);
        assert_eq!(children.len(), 1);
        assert_eq!(palette.node(children[0]).display_name, "Dust");
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut palette = Palette::new();
        let group = palette.add_group(leaf("liquids")).unwrap();
        palette.add_child(group, leaf("water")).unwrap();

        let err = palette.add_child(group, leaf("water")).unwrap_err();
        assert!(matches!(err, PaletteError::DuplicateId(id) if id == "water"));
        assert_eq!(palette.children(group).len(), 1);
    }

    #[test]
    fn test_foreign_parent_rejected_without_side_effects() {
        let mut other = Palette::new();
        other.add_group(leaf("g")).unwrap();
        let foreign = other.add_child(NodeId(0), leaf("g1")).unwrap();

        let mut palette = Palette::new();
        let err = palette.add_child(foreign, leaf("x")).unwrap_err();
        assert!(matches!(err, PaletteError::UnknownNode(id) if id == foreign));
        assert!(palette.is_empty());
        assert_eq!(palette.find("x"), None);
        assert!(palette.get(foreign).is_none());

        // The id is still free
        let x = palette.add_group(leaf("x")).unwrap();
        assert_eq!(palette.get(x).map(|n| n.id.as_str()), Some("x"));
    }

    #[test]
    fn test_depth_first_order_and_unbounded_depth() {
        let mut palette = Palette::new();
        let a = palette.add_group(leaf("a")).unwrap();
        let b = palette.add_group(leaf("b")).unwrap();
        let a1 = palette.add_child(a, leaf("a1")).unwrap();
        let a1x = palette.add_child(a1, leaf("a1x")).unwrap();
        let a2 = palette.add_child(a, leaf("a2")).unwrap();
        let b1 = palette.add_child(b, leaf("b1")).unwrap();

        assert_eq!(palette.iter_depth_first(), vec![a, a1, a1x, a2, b, b1]);
    }

    #[test]
    fn test_select_group_persists() {
        let (mut config, test_dir) = setup_test_config();
        let mut palette = Palette::new();
        palette.add_group(leaf("powders")).unwrap();
        let liquids = palette.add_group(leaf("liquids")).unwrap();
        let water = palette.add_child(liquids, leaf("water")).unwrap();

        palette.restore_selection(&config);
        assert_eq!(palette.selected(), palette.find("powders"));

        assert_eq!(palette.select_group("liquids", &mut config).unwrap(), liquids);
        assert_eq!(config.get_str(&SELECTED_GROUP_PATH, ""), "liquids");

        let err = palette.select_group("water", &mut config).unwrap_err();
        assert!(matches!(err, PaletteError::NotAGroup(_)));
        assert!(matches!(
            palette.select_group("lava", &mut config),
            Err(PaletteError::UnknownId(_))
        ));
        assert_ne!(palette.selected(), Some(water));

        let mut reloaded = Palette::new();
        reloaded.add_group(leaf("powders")).unwrap();
        let liquids_again = reloaded.add_group(leaf("liquids")).unwrap();
        reloaded.restore_selection(&config);
        assert_eq!(reloaded.selected(), Some(liquids_again));

        cleanup_test_dir(&test_dir);
    }

    #[test]
    fn test_cache_keys_are_distinct_per_node() {
        let palette = Palette::initial().unwrap();
        let pipeline = IconPipeline::new("/tmp/unused", 64);
        let powders = palette.find("powders").unwrap();
        let dust = palette.find("dust").unwrap();
        assert_ne!(
            palette.cache_key(powders, &pipeline),
            palette.cache_key(dust, &pipeline)
        );
    }
}
