// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative UI panel nodes.
//!
//! A panel is a tree of [`UiNode`]s rooted at a container. Nodes serialize
//! with an explicit `"type"` tag so the tree can be carried in a generic
//! attribute structure (`UiPanelInfo::config`).

use serde::{Deserialize, Serialize};

use crate::enums::{ComponentType, LayoutType};

/// One node of a declarative UI panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiNode {
    /// Groups children under a layout.
    Container {
        /// Container name.
        name: String,
        /// Child layout.
        layout: LayoutType,
        /// Ordered children.
        #[serde(default)]
        children: Vec<UiNode>,
    },
    /// Flat table fed by a UI_PRIMITIVE stream.
    Table {
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Source stream id.
        stream: String,
        /// Show the implicit object-id column.
        display_object_id: bool,
    },
    /// Hierarchical table fed by a UI_PRIMITIVE stream.
    #[serde(rename = "TREETABLE")]
    TreeTable {
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Source stream id.
        stream: String,
        /// Show the implicit object-id column.
        display_object_id: bool,
    },
    /// Metric chart over several streams.
    Metric {
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Source stream ids.
        streams: Vec<String>,
    },
    /// Plot of dependent streams against one independent stream.
    Plot {
        /// Title.
        title: String,
        /// Description.
        description: String,
        /// Independent variable stream id.
        independent_variable: String,
        /// Dependent variable stream ids.
        dependent_variables: Vec<String>,
    },
    /// Camera video.
    Video {
        /// Camera stream ids.
        cameras: Vec<String>,
    },
}

impl UiNode {
    /// Component kind of the node.
    pub const fn component_type(&self) -> ComponentType {
        match self {
            Self::Container { .. } => ComponentType::Container,
            Self::Table { .. } => ComponentType::Table,
            Self::TreeTable { .. } => ComponentType::TreeTable,
            Self::Metric { .. } => ComponentType::Metric,
            Self::Plot { .. } => ComponentType::Plot,
            Self::Video { .. } => ComponentType::Video,
        }
    }

    /// Child list of a container, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<UiNode>> {
        match self {
            Self::Container { children, .. } => Some(children),
            _ => None,
        }
    }
}
