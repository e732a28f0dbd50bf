// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State update message: timestamped per-stream payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::enums::{TreeTableColumnType, UpdateType};
use crate::style::StyleObjectValue;

/// One or more update frames.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StateUpdate {
    /// How the frames combine with earlier state.
    #[serde(default)]
    pub update_type: UpdateType,
    /// Update frames.
    #[serde(default)]
    pub updates: Vec<StreamSet>,
}

/// All stream payloads sharing one timestamp.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StreamSet {
    /// Frame time in seconds.
    #[serde(default)]
    pub timestamp: f64,
    /// Stream id to pose.
    #[serde(default)]
    pub poses: BTreeMap<String, Pose>,
    /// Stream id to geometry.
    #[serde(default)]
    pub primitives: BTreeMap<String, PrimitiveState>,
    /// Scalar samples.
    #[serde(default)]
    pub time_series: Vec<TimeSeriesState>,
    /// Stream id to tabular UI data.
    #[serde(default)]
    pub ui_primitives: BTreeMap<String, UiPrimitiveState>,
}

/// Position and orientation of a frame of reference.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// Pose time in seconds.
    #[serde(default)]
    pub timestamp: f64,
    /// Geographic anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_origin: Option<MapOrigin>,
    /// `x, y, z` in metres.
    #[serde(default)]
    pub position: Vec<f64>,
    /// `roll, pitch, yaw` in radians.
    #[serde(default)]
    pub orientation: Vec<f64>,
}

/// Geographic anchor of a pose.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct MapOrigin {
    /// Longitude in degrees.
    #[serde(default)]
    pub longitude: f64,
    /// Latitude in degrees.
    #[serde(default)]
    pub latitude: f64,
    /// Altitude in metres.
    #[serde(default)]
    pub altitude: f64,
}

/// Fields shared by every primitive.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrimitiveBase {
    /// Object identity across frames.
    #[serde(default)]
    pub object_id: String,
    /// Style classes declared in the stream metadata.
    #[serde(default)]
    pub classes: Vec<String>,
    /// Per-object style override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleObjectValue>,
}

/// Closed polygon with flattened `x, y, z` vertices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    /// Shared fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PrimitiveBase>,
    /// Flattened vertices.
    #[serde(default)]
    pub vertices: Vec<f32>,
}

/// Open polyline with flattened `x, y, z` vertices.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polyline {
    /// Shared fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PrimitiveBase>,
    /// Flattened vertices.
    #[serde(default)]
    pub vertices: Vec<f32>,
}

/// Circle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Circle {
    /// Shared fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PrimitiveBase>,
    /// `x, y, z` centre.
    #[serde(default)]
    pub center: Vec<f32>,
    /// Radius in metres.
    #[serde(default)]
    pub radius: f32,
}

/// Point cloud.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Shared fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PrimitiveBase>,
    /// Flattened `x, y, z` points.
    #[serde(default)]
    pub points: Vec<f32>,
    /// Flattened `r, g, b, a` per point; empty when uncoloured.
    #[serde(default, with = "crate::bytes")]
    pub colors: Vec<u8>,
}

/// Encoded image.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Image {
    /// Shared fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PrimitiveBase>,
    /// `x, y, z` anchor.
    #[serde(default)]
    pub position: Vec<f32>,
    /// Encoded image bytes.
    #[serde(default, with = "crate::bytes")]
    pub data: Vec<u8>,
    /// Width in pixels.
    #[serde(default)]
    pub width_px: u32,
    /// Height in pixels.
    #[serde(default)]
    pub height_px: u32,
}

/// Text label.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Text {
    /// Shared fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PrimitiveBase>,
    /// `x, y, z` anchor.
    #[serde(default)]
    pub position: Vec<f32>,
    /// Label text.
    #[serde(default)]
    pub text: String,
}

/// Geometry of one PRIMITIVE stream in one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrimitiveState {
    /// Polygons.
    #[serde(default)]
    pub polygons: Vec<Polygon>,
    /// Polylines.
    #[serde(default)]
    pub polylines: Vec<Polyline>,
    /// Text labels.
    #[serde(default)]
    pub texts: Vec<Text>,
    /// Circles.
    #[serde(default)]
    pub circles: Vec<Circle>,
    /// Images.
    #[serde(default)]
    pub images: Vec<Image>,
    /// Point clouds.
    #[serde(default)]
    pub points: Vec<Point>,
}

/// One scalar sample, shared by one or more streams.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeriesState {
    /// Sample time in seconds.
    #[serde(default)]
    pub timestamp: f64,
    /// Object the sample describes, if any.
    #[serde(default)]
    pub object_id: String,
    /// Streams the sample belongs to.
    #[serde(default)]
    pub streams: Vec<String>,
    /// Sample values; exactly one list holds one entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Values>,
}

/// Typed value lists of a time series sample.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Values {
    /// Double values.
    #[serde(default)]
    pub doubles: Vec<f64>,
    /// 32-bit integer values.
    #[serde(default)]
    pub int32s: Vec<i32>,
    /// Boolean values.
    #[serde(default)]
    pub bools: Vec<bool>,
    /// String values.
    #[serde(default)]
    pub strings: Vec<String>,
}

impl Values {
    /// Total number of values across all lists.
    pub fn len(&self) -> usize {
        self.doubles.len() + self.int32s.len() + self.bools.len() + self.strings.len()
    }

    /// `true` when no list holds a value.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tabular UI data of one UI_PRIMITIVE stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UiPrimitiveState {
    /// Hierarchical table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub treetable: Option<TreeTable>,
}

/// Typed columns plus id/parent-linked rows.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeTable {
    /// Column definitions.
    #[serde(default)]
    pub columns: Vec<TreeTableColumn>,
    /// Rows.
    #[serde(default)]
    pub nodes: Vec<TreeTableNode>,
}

/// Column definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreeTableColumn {
    /// Header text.
    #[serde(default)]
    pub display_text: String,
    /// Declared cell type.
    #[serde(default, rename = "type")]
    pub column_type: TreeTableColumnType,
    /// Unit label.
    #[serde(default)]
    pub unit: String,
}

/// One row; cells are stored as their string rendering.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TreeTableNode {
    /// Row id.
    #[serde(default)]
    pub id: i32,
    /// Parent row id, `0` for top-level rows.
    #[serde(default)]
    pub parent: i32,
    /// One rendered value per column.
    #[serde(default)]
    pub column_values: Vec<String>,
}
