// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! UI panel tree builder.
//!
//! Nodes live in an arena owned by the panel; containers refer to their
//! children by index. `container` pushes the current node on an explicit
//! stack and descends into the new child, `end_container` pops back up and
//! stays at the root once the stack is empty. Leaves attach to the current
//! node without moving it.

use serde_json::{Map, Value};
use xviz_proto::{LayoutType, UiNode, UiPanelInfo};

use crate::error::BuildError;

#[derive(Debug)]
struct ArenaNode {
    node: UiNode,
    children: Vec<usize>,
}

/// Accumulated layout of one panel.
#[derive(Debug, Default)]
pub(crate) struct PanelTree {
    nodes: Vec<ArenaNode>,
    stack: Vec<usize>,
    current: usize,
}

impl PanelTree {
    const ROOT: usize = 0;

    fn set_root(&mut self, name: &str, layout: LayoutType) {
        let root = UiNode::Container { name: name.to_owned(), layout, children: Vec::new() };
        match self.nodes.first_mut() {
            Some(existing) => existing.node = root,
            None => self.nodes.push(ArenaNode { node: root, children: Vec::new() }),
        }
        self.stack.clear();
        self.current = Self::ROOT;
    }

    fn attach(&mut self, node: UiNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(ArenaNode { node, children: Vec::new() });
        if let Some(parent) = self.nodes.get_mut(self.current) {
            parent.children.push(index);
        }
        index
    }

    fn push_container(&mut self, name: String, layout: LayoutType) {
        let index = self.attach(UiNode::Container { name, layout, children: Vec::new() });
        self.stack.push(self.current);
        self.current = index;
    }

    fn pop_container(&mut self) {
        if let Some(parent) = self.stack.pop() {
            self.current = parent;
        }
    }

    fn fold(&self, index: usize) -> Option<UiNode> {
        let entry = self.nodes.get(index)?;
        let mut node = entry.node.clone();
        if let Some(children) = node.children_mut() {
            *children = entry.children.iter().filter_map(|&child| self.fold(child)).collect();
        }
        Some(node)
    }

    /// Folds the tree into a generic attribute structure tagged
    /// `"type": "PANEL"`. `None` when no root container was declared.
    pub(crate) fn to_config(&self, panel: &str) -> Result<Option<Map<String, Value>>, BuildError> {
        let Some(root) = self.fold(Self::ROOT) else {
            return Ok(None);
        };
        let encode = |source| BuildError::PanelEncode { panel: panel.to_owned(), source };
        let mut config: Map<String, Value> = serde_json::to_value(&root)
            .and_then(serde_json::from_value)
            .map_err(encode)?;
        config.insert("type".to_owned(), Value::from("PANEL"));
        Ok(Some(config))
    }
}

/// Builder over one UI panel, borrowed from a
/// [`MetadataBuilder`](crate::MetadataBuilder).
#[derive(Debug)]
pub struct UiPanelBuilder<'a> {
    panel: &'a str,
    info: &'a mut UiPanelInfo,
    tree: &'a mut PanelTree,
}

impl<'a> UiPanelBuilder<'a> {
    pub(crate) fn new(panel: &'a str, info: &'a mut UiPanelInfo, tree: &'a mut PanelTree) -> Self {
        info.name = panel.to_owned();
        Self { panel, info, tree }
    }

    /// Declares a stream the panel reads.
    pub fn needed_stream(self, stream: impl Into<String>) -> Self {
        self.info.needed_streams.push(stream.into());
        self
    }

    /// Declares the root container. Its name must equal the panel name.
    pub fn container(self, name: &str, layout: LayoutType) -> Result<ContainerBuilder<'a>, BuildError> {
        if name != self.panel {
            return Err(BuildError::PanelNameMismatch { panel: self.panel.to_owned(), name: name.to_owned() });
        }
        self.tree.set_root(name, layout);
        Ok(ContainerBuilder { tree: self.tree })
    }
}

/// Cursor into a panel tree.
#[derive(Debug)]
pub struct ContainerBuilder<'a> {
    tree: &'a mut PanelTree,
}

impl ContainerBuilder<'_> {
    /// Adds a child container and descends into it.
    pub fn container(self, name: impl Into<String>, layout: LayoutType) -> Self {
        self.tree.push_container(name.into(), layout);
        self
    }

    /// Returns to the parent container; stays put at the root.
    pub fn end_container(self) -> Self {
        self.tree.pop_container();
        self
    }

    /// Adds a table fed by `stream`.
    pub fn table(
        self,
        title: impl Into<String>,
        description: impl Into<String>,
        stream: impl Into<String>,
        display_object_id: bool,
    ) -> Self {
        self.tree.attach(UiNode::Table {
            title: title.into(),
            description: description.into(),
            stream: stream.into(),
            display_object_id,
        });
        self
    }

    /// Adds a tree table fed by `stream`.
    pub fn tree_table(
        self,
        title: impl Into<String>,
        description: impl Into<String>,
        stream: impl Into<String>,
        display_object_id: bool,
    ) -> Self {
        self.tree.attach(UiNode::TreeTable {
            title: title.into(),
            description: description.into(),
            stream: stream.into(),
            display_object_id,
        });
        self
    }

    /// Adds a metric chart over `streams`.
    pub fn metric<I, S>(self, title: impl Into<String>, description: impl Into<String>, streams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tree.attach(UiNode::Metric {
            title: title.into(),
            description: description.into(),
            streams: streams.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds a plot of `dependent` streams against `independent`.
    pub fn plot<I, S>(
        self,
        title: impl Into<String>,
        description: impl Into<String>,
        independent: impl Into<String>,
        dependent: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tree.attach(UiNode::Plot {
            title: title.into(),
            description: description.into(),
            independent_variable: independent.into(),
            dependent_variables: dependent.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Adds a video view over `cameras`.
    pub fn video<I, S>(self, cameras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tree.attach(UiNode::Video { cameras: cameras.into_iter().map(Into::into).collect() });
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn end_container_at_root_stays_at_root() {
        let mut tree = PanelTree::default();
        tree.set_root("p", LayoutType::Vertical);
        tree.pop_container();
        tree.pop_container();
        tree.attach(UiNode::Video { cameras: vec![] });
        let config = tree.to_config("p").unwrap().unwrap();
        assert_eq!(config["children"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn panel_without_root_has_no_config() {
        assert!(PanelTree::default().to_config("p").unwrap().is_none());
    }

    #[test]
    fn root_tag_is_overwritten_with_panel() {
        let mut tree = PanelTree::default();
        tree.set_root("p", LayoutType::Horizontal);
        let config = tree.to_config("p").unwrap().unwrap();
        assert_eq!(config["type"], "PANEL");
        assert_eq!(config["name"], "p");
        assert_eq!(config["layout"], "HORIZONTAL");
    }
}
