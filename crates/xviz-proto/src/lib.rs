// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! XVIZ schema data layer.
//!
//! Plain serde message types for the two top-level messages ([`Metadata`] and
//! [`StateUpdate`]), the typed [`Envelope`] that carries them, and the
//! [`wire`] codecs: JSON with schema field names, and a `PBE1`-prefixed CBOR
//! binary frame.
//!
//! Scalar and repeated fields are always serialized, so a decoded message
//! reproduces default values exactly. Singular sub-messages are `Option`s and
//! are omitted when unset.

mod bytes;
pub mod envelope;
pub mod enums;
pub mod metadata;
pub mod state;
pub mod style;
pub mod ui;
pub mod wire;

pub use envelope::{Envelope, EnvelopeRef, METADATA_TYPE, STATE_UPDATE_TYPE};
pub use enums::{
    Category, ComponentType, CoordinateType, LayoutType, PointColorMode, PrimitiveType,
    ScalarType, TextAlignmentBaseline, TextAnchor, TreeTableColumnType, UnknownEnumValue,
    UpdateType,
};
pub use metadata::{Metadata, StreamMetadata, StyleClass, UiPanelInfo};
pub use state::{
    Circle, Image, MapOrigin, Point, Polygon, Polyline, Pose, PrimitiveBase, PrimitiveState,
    StateUpdate, StreamSet, Text, TimeSeriesState, TreeTable, TreeTableColumn, TreeTableNode,
    UiPrimitiveState, Values,
};
pub use style::{Color, FieldDescriptor, FieldKind, Setter, StyleObjectValue, StyleSchema, StyleStreamValue};
pub use ui::UiNode;
pub use wire::{MAGIC, WireError};
