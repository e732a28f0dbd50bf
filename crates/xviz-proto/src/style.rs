// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Style messages and their field registry.
//!
//! Style fields are presence-tracked: an unset field is `None` and is omitted
//! from every encoding, so a partially populated style never overrides the
//! renderer's defaults. Colours are raw bytes in memory and on the binary wire
//! and `#`-prefixed hex in JSON.
//!
//! Each style message implements [`StyleSchema`], a static table mapping a
//! field name to its declared kind and a setter. Callers holding an
//! open-ended name/value bag use it to populate the message without runtime
//! reflection.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::enums::{PointColorMode, TextAlignmentBaseline, TextAnchor, UnknownEnumValue};

/// Raw colour bytes (`RGB` or `RGBA`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Color(pub Vec<u8>);

impl Color {
    /// Decodes `#RRGGBB` / `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(text: &str) -> Result<Self, hex::FromHexError> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        hex::decode(digits).map(Self)
    }

    /// Renders the bytes as `#` followed by lowercase hex.
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode(&self.0))
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Color {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<[u8; 3]> for Color {
    fn from(rgb: [u8; 3]) -> Self {
        Self(rgb.to_vec())
    }
}

impl From<[u8; 4]> for Color {
    fn from(rgba: [u8; 4]) -> Self {
        Self(rgba.to_vec())
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_hex())
        } else {
            serializer.serialize_bytes(&self.0)
        }
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ColorVisitor)
    }
}

struct ColorVisitor;

impl<'de> Visitor<'de> for ColorVisitor {
    type Value = Color;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a #hex colour string or colour bytes")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Color, E> {
        Color::from_hex(v).map_err(E::custom)
    }

    fn visit_bytes<E: de::Error>(self, v: &[u8]) -> Result<Color, E> {
        Ok(Color(v.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, v: Vec<u8>) -> Result<Color, E> {
        Ok(Color(v))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Color, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(4));
        while let Some(b) = seq.next_element::<u8>()? {
            bytes.push(b);
        }
        Ok(Color(bytes))
    }
}

/// Per-object style overrides (primitive base style, style classes).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleObjectValue {
    /// Fill colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    /// Stroke colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    /// Stroke width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    /// Circle or point radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Text size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    /// Text rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_rotation: Option<f32>,
    /// Horizontal text anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<TextAnchor>,
    /// Vertical text alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_baseline: Option<TextAlignmentBaseline>,
    /// Extrusion height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
}

/// Stream-wide default style.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StyleStreamValue {
    /// Fill colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<Color>,
    /// Stroke colour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,
    /// Stroke width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f32>,
    /// Circle or point radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    /// Text size.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_size: Option<f32>,
    /// Text rotation in degrees.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_rotation: Option<f32>,
    /// Horizontal text anchor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_anchor: Option<TextAnchor>,
    /// Vertical text alignment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_baseline: Option<TextAlignmentBaseline>,
    /// Extrusion height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f32>,
    /// Font weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    /// Font family.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Lower radius clamp in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_min_pixels: Option<u32>,
    /// Upper radius clamp in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_max_pixels: Option<u32>,
    /// Lower stroke width clamp in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width_min_pixels: Option<u32>,
    /// Upper stroke width clamp in pixels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width_max_pixels: Option<u32>,
    /// Fixed pixel radius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius_pixels: Option<u32>,
    /// Layer opacity in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    /// Draw outlines.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroked: Option<bool>,
    /// Draw fills.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled: Option<bool>,
    /// Extrude polygons by `height`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extruded: Option<bool>,
    /// Point cloud colouring mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_color_mode: Option<PointColorMode>,
    /// Value domain for point colouring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub point_color_domain: Option<Vec<f32>>,
}

// ---------------------------------------------------------------------------
// Field registry
// ---------------------------------------------------------------------------

/// Declared kind of a style field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// UTF-8 string.
    String,
    /// Raw bytes authored as a `#`-hex string (colours).
    Bytes,
    /// Boolean.
    Bool,
    /// 32-bit float.
    Float,
    /// Repeated 32-bit float.
    FloatList,
    /// Unsigned 32-bit integer.
    UInt32,
    /// Enum carried as its integer tag.
    Enum,
}

impl FieldKind {
    /// Human-readable kind name used in diagnostics.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Bytes => "bytes",
            Self::Bool => "bool",
            Self::Float => "float",
            Self::FloatList => "repeated float",
            Self::UInt32 => "uint32",
            Self::Enum => "enum",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed setter for one field of style message `S`.
pub enum Setter<S> {
    /// String field.
    Str(fn(&mut S, String)),
    /// Bytes field.
    Bytes(fn(&mut S, Vec<u8>)),
    /// Boolean field.
    Bool(fn(&mut S, bool)),
    /// Float field.
    Float(fn(&mut S, f32)),
    /// Repeated float field.
    Floats(fn(&mut S, Vec<f32>)),
    /// Unsigned integer field.
    UInt32(fn(&mut S, u32)),
    /// Enum field; rejects tags the enum does not define.
    Enum(fn(&mut S, i32) -> Result<(), UnknownEnumValue>),
}

impl<S> Setter<S> {
    /// Declared kind of the field this setter writes.
    pub const fn kind(&self) -> FieldKind {
        match self {
            Self::Str(_) => FieldKind::String,
            Self::Bytes(_) => FieldKind::Bytes,
            Self::Bool(_) => FieldKind::Bool,
            Self::Float(_) => FieldKind::Float,
            Self::Floats(_) => FieldKind::FloatList,
            Self::UInt32(_) => FieldKind::UInt32,
            Self::Enum(_) => FieldKind::Enum,
        }
    }
}

/// One named entry of a style registry.
pub struct FieldDescriptor<S> {
    /// Schema field name.
    pub name: &'static str,
    /// Setter for the field.
    pub setter: Setter<S>,
}

impl<S> FieldDescriptor<S> {
    /// Declared kind of the field.
    pub const fn kind(&self) -> FieldKind {
        self.setter.kind()
    }
}

/// A style message that can be populated by field name.
pub trait StyleSchema: Default + Serialize + Sized + 'static {
    /// Schema message name used in diagnostics.
    const MESSAGE_NAME: &'static str;

    /// Every settable field.
    fn fields() -> &'static [FieldDescriptor<Self>];

    /// Looks a field up by name.
    fn field(name: &str) -> Option<&'static FieldDescriptor<Self>> {
        Self::fields().iter().find(|f| f.name == name)
    }
}

macro_rules! style_field {
    ($ty:ident, $field:ident, color) => {
        FieldDescriptor { name: stringify!($field), setter: Setter::Bytes(|s: &mut $ty, v| s.$field = Some(Color(v))) }
    };
    ($ty:ident, $field:ident, string) => {
        FieldDescriptor { name: stringify!($field), setter: Setter::Str(|s: &mut $ty, v| s.$field = Some(v)) }
    };
    ($ty:ident, $field:ident, bool) => {
        FieldDescriptor { name: stringify!($field), setter: Setter::Bool(|s: &mut $ty, v| s.$field = Some(v)) }
    };
    ($ty:ident, $field:ident, float) => {
        FieldDescriptor { name: stringify!($field), setter: Setter::Float(|s: &mut $ty, v| s.$field = Some(v)) }
    };
    ($ty:ident, $field:ident, floats) => {
        FieldDescriptor { name: stringify!($field), setter: Setter::Floats(|s: &mut $ty, v| s.$field = Some(v)) }
    };
    ($ty:ident, $field:ident, uint32) => {
        FieldDescriptor { name: stringify!($field), setter: Setter::UInt32(|s: &mut $ty, v| s.$field = Some(v)) }
    };
    ($ty:ident, $field:ident, enumeration, $enum_ty:ty) => {
        FieldDescriptor {
            name: stringify!($field),
            setter: Setter::Enum(|s: &mut $ty, v| {
                s.$field = Some(<$enum_ty>::try_from(v)?);
                Ok(())
            }),
        }
    };
}

macro_rules! style_schema {
    ($ty:ident ($msg:literal) { $($field:ident : $kind:ident $(($enum_ty:ty))?),+ $(,)? }) => {
        impl StyleSchema for $ty {
            const MESSAGE_NAME: &'static str = $msg;

            fn fields() -> &'static [FieldDescriptor<Self>] {
                const FIELDS: &[FieldDescriptor<$ty>] = &[$(style_field!($ty, $field, $kind $(, $enum_ty)?)),+];
                FIELDS
            }
        }
    };
}

style_schema! {
    StyleObjectValue ("StyleObjectValue") {
        fill_color: color,
        stroke_color: color,
        stroke_width: float,
        radius: float,
        text_size: float,
        text_rotation: float,
        text_anchor: enumeration(TextAnchor),
        text_baseline: enumeration(TextAlignmentBaseline),
        height: float,
    }
}

style_schema! {
    StyleStreamValue ("StyleStreamValue") {
        fill_color: color,
        stroke_color: color,
        stroke_width: float,
        radius: float,
        text_size: float,
        text_rotation: float,
        text_anchor: enumeration(TextAnchor),
        text_baseline: enumeration(TextAlignmentBaseline),
        height: float,
        font_weight: uint32,
        font_family: string,
        radius_min_pixels: uint32,
        radius_max_pixels: uint32,
        stroke_width_min_pixels: uint32,
        stroke_width_max_pixels: uint32,
        radius_pixels: uint32,
        opacity: float,
        stroked: bool,
        filled: bool,
        extruded: bool,
        point_color_mode: enumeration(PointColorMode),
        point_color_domain: floats,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;

    #[test]
    fn colour_json_is_hex_and_cbor_is_bytes() {
        let style = StyleObjectValue { fill_color: Some(Color(vec![0xff, 0x00, 0x80])), ..Default::default() };
        let json = serde_json::to_string(&style).unwrap();
        assert_eq!(json, r##"{"fill_color":"#ff0080"}"##);

        let mut cbor = Vec::new();
        ciborium::into_writer(&style, &mut cbor).unwrap();
        let back: StyleObjectValue = ciborium::from_reader(cbor.as_slice()).unwrap();
        assert_eq!(back, style);
    }

    #[test]
    fn odd_length_hex_is_rejected() {
        assert!(Color::from_hex("#abc").is_err());
        assert!(serde_json::from_str::<StyleObjectValue>(r##"{"fill_color":"#12345"}"##).is_err());
    }

    #[test]
    fn registry_covers_every_serialized_field() {
        let style = StyleStreamValue {
            fill_color: Some(Color::default()),
            stroke_color: Some(Color::default()),
            stroke_width: Some(0.0),
            radius: Some(0.0),
            text_size: Some(0.0),
            text_rotation: Some(0.0),
            text_anchor: Some(TextAnchor::Start),
            text_baseline: Some(TextAlignmentBaseline::Top),
            height: Some(0.0),
            font_weight: Some(0),
            font_family: Some(String::new()),
            radius_min_pixels: Some(0),
            radius_max_pixels: Some(0),
            stroke_width_min_pixels: Some(0),
            stroke_width_max_pixels: Some(0),
            radius_pixels: Some(0),
            opacity: Some(0.0),
            stroked: Some(false),
            filled: Some(false),
            extruded: Some(false),
            point_color_mode: Some(PointColorMode::Default),
            point_color_domain: Some(Vec::new()),
        };
        let value = serde_json::to_value(&style).unwrap();
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), StyleStreamValue::fields().len());
        for key in keys {
            assert!(StyleStreamValue::field(key).is_some(), "{key} missing from registry");
        }
    }

    #[test]
    fn enum_setter_rejects_unknown_tags() {
        let field = StyleObjectValue::field("text_anchor").unwrap();
        let Setter::Enum(set) = field.setter else {
            panic!("text_anchor should be an enum field");
        };
        let mut style = StyleObjectValue::default();
        assert!(set(&mut style, 9).is_err());
        set(&mut style, 2).unwrap();
        assert_eq!(style.text_anchor, Some(TextAnchor::Middle));
    }
}
