// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Wire enums.
//!
//! Every enum reserves tag `0` for an `Invalid` sentinel meaning "unset". In
//! human-readable formats (JSON) the variant is written by name, in binary
//! formats by integer tag. Decoding accepts either form.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// An integer tag that does not name a variant of the target enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{value} is not a valid {enum_name} tag")]
pub struct UnknownEnumValue {
    /// Enum the tag was decoded into.
    pub enum_name: &'static str,
    /// Offending tag.
    pub value: i32,
}

macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($invalid:literal) {
            $( $(#[$vmeta:meta])* $variant:ident = $tag:literal => $vname:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
        pub enum $name {
            /// Unset sentinel (tag 0).
            #[default]
            Invalid,
            $( $(#[$vmeta])* $variant, )+
        }

        impl $name {
            /// Every concrete (non-sentinel) variant, in tag order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Integer tag used on the binary wire.
            pub const fn tag(self) -> i32 {
                match self {
                    Self::Invalid => 0,
                    $(Self::$variant => $tag,)+
                }
            }

            /// Schema name used in JSON.
            pub const fn name(self) -> &'static str {
                match self {
                    Self::Invalid => $invalid,
                    $(Self::$variant => $vname,)+
                }
            }

            /// `false` for the unset sentinel.
            pub const fn is_set(self) -> bool {
                !matches!(self, Self::Invalid)
            }

            /// Looks a variant up by its schema name.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $invalid => Some(Self::Invalid),
                    $($vname => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl TryFrom<i32> for $name {
            type Error = UnknownEnumValue;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                match value {
                    0 => Ok(Self::Invalid),
                    $($tag => Ok(Self::$variant),)+
                    _ => Err(UnknownEnumValue { enum_name: stringify!($name), value }),
                }
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.tag()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(self.name())
                } else {
                    serializer.serialize_i32(self.tag())
                }
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                deserializer.deserialize_any(TagVisitor::<$name>::new(stringify!($name)))
            }
        }

        impl WireEnum for $name {
            fn from_tag(tag: i32) -> Result<Self, UnknownEnumValue> {
                Self::try_from(tag)
            }

            fn lookup(name: &str) -> Option<Self> {
                Self::from_name(name)
            }
        }
    };
}

/// Shared decode surface for the generated enums.
trait WireEnum: Sized {
    fn from_tag(tag: i32) -> Result<Self, UnknownEnumValue>;
    fn lookup(name: &str) -> Option<Self>;
}

struct TagVisitor<T> {
    expecting: &'static str,
    marker: std::marker::PhantomData<T>,
}

impl<T> TagVisitor<T> {
    const fn new(expecting: &'static str) -> Self {
        Self { expecting, marker: std::marker::PhantomData }
    }
}

impl<T: WireEnum> Visitor<'_> for TagVisitor<T> {
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "a {} name or integer tag", self.expecting)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<T, E> {
        T::lookup(v).ok_or_else(|| E::custom(format!("unknown {} name {v:?}", self.expecting)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<T, E> {
        let tag = i32::try_from(v).map_err(|_| E::custom(format!("{} tag {v} out of range", self.expecting)))?;
        T::from_tag(tag).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<T, E> {
        let tag = i32::try_from(v).map_err(|_| E::custom(format!("{} tag {v} out of range", self.expecting)))?;
        T::from_tag(tag).map_err(E::custom)
    }
}

wire_enum! {
    /// Top-level kind of a stream's data.
    pub enum Category ("STREAM_METADATA_CATEGORY_INVALID") {
        /// Vehicle or object pose.
        Pose = 3 => "POSE",
        /// Renderable geometry.
        Primitive = 4 => "PRIMITIVE",
        /// Tabular UI data.
        UiPrimitive = 5 => "UI_PRIMITIVE",
        /// Timestamped scalar samples.
        TimeSeries = 6 => "TIME_SERIES",
        /// Untimed scalar values.
        Variable = 7 => "VARIABLE",
    }
}

wire_enum! {
    /// Geometry kind carried by a PRIMITIVE stream.
    pub enum PrimitiveType ("STREAM_METADATA_PRIMITIVE_TYPE_INVALID") {
        /// Circle.
        Circle = 1 => "CIRCLE",
        /// Image.
        Image = 2 => "IMAGE",
        /// Point cloud.
        Point = 3 => "POINT",
        /// Closed polygon.
        Polygon = 4 => "POLYGON",
        /// Open polyline.
        Polyline = 5 => "POLYLINE",
        /// Text label.
        Text = 6 => "TEXT",
    }
}

wire_enum! {
    /// Value kind carried by a TIME_SERIES or VARIABLE stream.
    pub enum ScalarType ("STREAM_METADATA_SCALAR_TYPE_INVALID") {
        /// Double precision float.
        Float = 1 => "FLOAT",
        /// 32-bit signed integer.
        Int32 = 2 => "INT32",
        /// UTF-8 string.
        String = 3 => "STRING",
        /// Boolean.
        Boolean = 4 => "BOOLEAN",
    }
}

wire_enum! {
    /// Coordinate frame a stream's geometry is expressed in.
    pub enum CoordinateType ("STREAM_METADATA_COORDINATE_TYPE_INVALID") {
        /// Longitude/latitude/altitude.
        Geographic = 1 => "GEOGRAPHIC",
        /// World frame.
        Identity = 2 => "IDENTITY",
        /// Frame supplied per stream by a transform.
        Dynamic = 3 => "DYNAMIC",
        /// Relative to the vehicle pose.
        VehicleRelative = 4 => "VEHICLE_RELATIVE",
    }
}

wire_enum! {
    /// How a state update combines with earlier ones.
    pub enum UpdateType ("UPDATE_TYPE_INVALID") {
        /// Replaces all earlier state.
        Snapshot = 1 => "SNAPSHOT",
        /// Extends earlier state.
        Append = 2 => "APPEND",
    }
}

wire_enum! {
    /// Horizontal text anchor.
    pub enum TextAnchor ("TEXT_ANCHOR_INVALID") {
        /// Start of the text.
        Start = 1 => "START",
        /// Middle of the text.
        Middle = 2 => "MIDDLE",
        /// End of the text.
        End = 3 => "END",
    }
}

wire_enum! {
    /// Vertical text alignment.
    pub enum TextAlignmentBaseline ("TEXT_ALIGNMENT_BASELINE_INVALID") {
        /// Top edge.
        Top = 1 => "TOP",
        /// Vertical centre.
        Center = 2 => "CENTER",
        /// Bottom edge.
        Bottom = 3 => "BOTTOM",
    }
}

wire_enum! {
    /// Point cloud colouring mode.
    pub enum PointColorMode ("POINT_COLOR_MODE_INVALID") {
        /// Colour by elevation.
        Elevation = 1 => "ELEVATION",
        /// Colour by distance to the vehicle.
        DistanceToVehicle = 2 => "DISTANCE_TO_VEHICLE",
        /// Per-point colours or stream fill colour.
        Default = 3 => "DEFAULT",
    }
}

wire_enum! {
    /// Child layout of a UI container.
    pub enum LayoutType ("LAYOUT_TYPE_INVALID") {
        /// Children stacked top to bottom.
        Vertical = 1 => "VERTICAL",
        /// Children laid out left to right.
        Horizontal = 2 => "HORIZONTAL",
    }
}

wire_enum! {
    /// Declarative UI node kind.
    pub enum ComponentType ("COMPONENT_TYPE_INVALID") {
        /// Container of child nodes.
        Container = 1 => "CONTAINER",
        /// Metric chart.
        Metric = 2 => "METRIC",
        /// XY plot.
        Plot = 3 => "PLOT",
        /// Flat table.
        Table = 4 => "TABLE",
        /// Hierarchical table.
        TreeTable = 5 => "TREETABLE",
        /// Camera video.
        Video = 6 => "VIDEO",
    }
}

wire_enum! {
    /// Declared cell type of a tree-table column.
    pub enum TreeTableColumnType ("TREE_TABLE_COLUMN_TYPE_INVALID") {
        /// 32-bit signed integer.
        Int32 = 1 => "INT32",
        /// Double precision float.
        Double = 2 => "DOUBLE",
        /// UTF-8 string.
        String = 3 => "STRING",
        /// Boolean.
        Boolean = 4 => "BOOLEAN",
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn zero_tag_is_the_unset_sentinel() {
        assert_eq!(Category::try_from(0).unwrap(), Category::Invalid);
        assert!(!Category::default().is_set());
        assert!(Category::Pose.is_set());
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = PrimitiveType::try_from(42).unwrap_err();
        assert_eq!(err.enum_name, "PrimitiveType");
        assert_eq!(err.value, 42);
    }

    #[test]
    fn every_variant_survives_tag_and_name_lookup() {
        for c in Category::ALL {
            assert_eq!(Category::try_from(c.tag()).unwrap(), *c);
            assert_eq!(Category::from_name(c.name()), Some(*c));
        }
    }

    #[test]
    fn json_uses_names_and_accepts_tags() {
        assert_eq!(serde_json::to_string(&LayoutType::Vertical).unwrap(), "\"VERTICAL\"");
        let from_tag: CoordinateType = serde_json::from_str("2").unwrap();
        assert_eq!(from_tag, CoordinateType::Identity);
        assert!(serde_json::from_str::<CoordinateType>("\"SIDEWAYS\"").is_err());
    }

    #[test]
    fn cbor_uses_integer_tags() {
        let mut bytes = Vec::new();
        ciborium::into_writer(&Category::Primitive, &mut bytes).unwrap();
        assert_eq!(bytes, vec![0x04]);
        let back: Category = ciborium::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(back, Category::Primitive);
    }
}
