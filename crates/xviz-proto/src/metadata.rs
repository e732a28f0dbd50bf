// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Metadata message: stream descriptors and UI panel configuration.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{Category, CoordinateType, PrimitiveType, ScalarType};
use crate::style::{StyleObjectValue, StyleStreamValue};

/// Describes every stream a source will emit, plus optional UI panels.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Protocol version string.
    #[serde(default)]
    pub version: String,
    /// Stream id to descriptor.
    #[serde(default)]
    pub streams: BTreeMap<String, StreamMetadata>,
    /// Panel name to panel definition.
    #[serde(default)]
    pub ui_config: BTreeMap<String, UiPanelInfo>,
}

/// Shape and semantics of one stream.
///
/// `primitive_type` is meaningful only for [`Category::Primitive`];
/// `scalar_type` and `units` only for [`Category::TimeSeries`] and
/// [`Category::Variable`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamMetadata {
    /// Stream category.
    #[serde(default)]
    pub category: Category,
    /// Scalar kind of TIME_SERIES / VARIABLE streams.
    #[serde(default)]
    pub scalar_type: ScalarType,
    /// Geometry kind of PRIMITIVE streams.
    #[serde(default)]
    pub primitive_type: PrimitiveType,
    /// Coordinate frame.
    #[serde(default)]
    pub coordinate: CoordinateType,
    /// Unit label of scalar streams.
    #[serde(default)]
    pub units: String,
    /// Default style for every object on the stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_style: Option<StyleStreamValue>,
    /// Named style overrides selectable through `PrimitiveBase::classes`.
    #[serde(default)]
    pub style_classes: Vec<StyleClass>,
}

/// A named style override.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleClass {
    /// Class name.
    #[serde(default)]
    pub name: String,
    /// Style applied to objects carrying the class.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleObjectValue>,
}

/// A UI panel: the streams it needs and its declarative layout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiPanelInfo {
    /// Panel name (matches its key in `ui_config`).
    #[serde(default)]
    pub name: String,
    /// Streams the panel reads.
    #[serde(default)]
    pub needed_streams: Vec<String>,
    /// Panel layout as a generic attribute structure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<serde_json::Map<String, serde_json::Value>>,
}
