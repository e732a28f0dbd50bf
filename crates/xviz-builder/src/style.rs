// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Style maps and their conversion into schema style messages.
//!
//! A [`StyleMap`] is an open-ended `name -> value` bag. [`convert`] maps it
//! onto a [`StyleSchema`] message using the message's static field registry.
//! String values written to colour (bytes) fields are decoded from `#hex`;
//! every other kind requires an exact tag match.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use xviz_proto::{FieldKind, PointColorMode, Setter, StyleSchema, TextAlignmentBaseline, TextAnchor};

/// A tagged style value.
#[derive(Debug, Clone, PartialEq)]
pub enum StyleValue {
    /// Unsigned integer.
    UInt(u32),
    /// Float.
    Float(f32),
    /// String; `#hex` for colours.
    Str(String),
    /// Boolean.
    Bool(bool),
    /// Enum tag.
    Enum(i32),
    /// List of floats.
    Floats(Vec<f32>),
}

impl StyleValue {
    /// Tag name used in diagnostics.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::UInt(_) => "uint32",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::Bool(_) => "bool",
            Self::Enum(_) => "enum",
            Self::Floats(_) => "repeated float",
        }
    }
}

impl From<u32> for StyleValue {
    fn from(v: u32) -> Self {
        Self::UInt(v)
    }
}

impl From<f32> for StyleValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for StyleValue {
    #[allow(clippy::cast_possible_truncation)]
    fn from(v: f64) -> Self {
        Self::Float(v as f32)
    }
}

impl From<&str> for StyleValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<String> for StyleValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for StyleValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<Vec<f32>> for StyleValue {
    fn from(v: Vec<f32>) -> Self {
        Self::Floats(v)
    }
}

impl From<&[f32]> for StyleValue {
    fn from(v: &[f32]) -> Self {
        Self::Floats(v.to_vec())
    }
}

impl From<TextAnchor> for StyleValue {
    fn from(v: TextAnchor) -> Self {
        Self::Enum(v.tag())
    }
}

impl From<TextAlignmentBaseline> for StyleValue {
    fn from(v: TextAlignmentBaseline) -> Self {
        Self::Enum(v.tag())
    }
}

impl From<PointColorMode> for StyleValue {
    fn from(v: PointColorMode) -> Self {
        Self::Enum(v.tag())
    }
}

/// Field name to value.
pub type StyleMap = BTreeMap<String, StyleValue>;

/// Builds a [`StyleMap`] from `"name" => value` pairs.
///
/// ```
/// use xviz_builder::style;
///
/// let map = style! { "fill_color" => "#ff0000", "stroke_width" => 2.0 };
/// assert_eq!(map.len(), 2);
/// ```
#[macro_export]
macro_rules! style {
    () => {
        $crate::StyleMap::new()
    };
    ($($name:expr => $value:expr),+ $(,)?) => {{
        let mut map = $crate::StyleMap::new();
        $(map.insert(::std::string::String::from($name), $crate::StyleValue::from($value));)+
        map
    }};
}

/// Style map conversion errors.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The target message has no field with this name.
    #[error("{message} has no field {field:?}")]
    UnknownField {
        /// Target message name.
        message: &'static str,
        /// Offending key.
        field: String,
    },
    /// The value's tag does not match the field's declared kind.
    #[error("style {field} expects {expected}, got {found}")]
    TypeMismatch {
        /// Field name.
        field: String,
        /// Declared kind.
        expected: FieldKind,
        /// Tag of the supplied value.
        found: &'static str,
    },
    /// A `#` colour string is not valid hex.
    #[error("style {field}: {value:?} is not a hex colour: {source}")]
    InvalidColor {
        /// Field name.
        field: String,
        /// Supplied text.
        value: String,
        /// Hex decode error.
        source: hex::FromHexError,
    },
    /// An enum tag the field's enum does not define.
    #[error("style {field}: {source}")]
    UnknownEnumValue {
        /// Field name.
        field: String,
        /// Decode error.
        source: xviz_proto::UnknownEnumValue,
    },
}

/// Converts `map` into style message `S`.
///
/// Either every entry converts or an error is returned; no partially filled
/// message escapes.
pub fn convert<S: StyleSchema>(map: &StyleMap) -> Result<S, StyleError> {
    let mut out = S::default();
    for (name, value) in map {
        let field = S::field(name)
            .ok_or_else(|| StyleError::UnknownField { message: S::MESSAGE_NAME, field: name.clone() })?;
        match (&field.setter, value) {
            (Setter::Str(set), StyleValue::Str(s)) => set(&mut out, s.clone()),
            (Setter::Bytes(set), StyleValue::Str(s)) => set(&mut out, decode_bytes(name, s)?),
            (Setter::Bool(set), StyleValue::Bool(b)) => set(&mut out, *b),
            (Setter::Float(set), StyleValue::Float(f)) => set(&mut out, *f),
            (Setter::Floats(set), StyleValue::Floats(v)) => set(&mut out, v.clone()),
            (Setter::UInt32(set), StyleValue::UInt(u)) => set(&mut out, *u),
            (Setter::Enum(set), StyleValue::Enum(tag)) => set(&mut out, *tag)
                .map_err(|source| StyleError::UnknownEnumValue { field: name.clone(), source })?,
            (setter, value) => {
                return Err(StyleError::TypeMismatch {
                    field: name.clone(),
                    expected: setter.kind(),
                    found: value.kind_name(),
                });
            }
        }
    }
    Ok(out)
}

/// Like [`convert`], but an empty map means "no style" and yields `None`.
pub fn convert_optional<S: StyleSchema>(map: &StyleMap) -> Result<Option<S>, StyleError> {
    if map.is_empty() {
        return Ok(None);
    }
    convert(map).map(Some)
}

fn decode_bytes(field: &str, text: &str) -> Result<Vec<u8>, StyleError> {
    match text.strip_prefix('#') {
        Some(digits) => hex::decode(digits).map_err(|source| StyleError::InvalidColor {
            field: field.to_owned(),
            value: text.to_owned(),
            source,
        }),
        None => Ok(text.as_bytes().to_vec()),
    }
}

/// Renders a style message as a generic attribute structure.
///
/// Colours come back as `#`-prefixed lowercase hex, the inverse of the
/// decoding [`convert`] applies; enums come back by name.
pub fn style_to_attributes<S: Serialize>(style: &S) -> Result<serde_json::Map<String, serde_json::Value>, serde_json::Error> {
    serde_json::to_value(style).and_then(serde_json::from_value)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::panic)]

    use super::*;
    use xviz_proto::{Color, StyleObjectValue, StyleStreamValue};

    #[test]
    fn hash_string_on_colour_field_is_hex_decoded() {
        let style: StyleObjectValue = convert(&style! { "fill_color" => "#0a0b0c" }).unwrap();
        assert_eq!(style.fill_color, Some(Color(vec![0x0a, 0x0b, 0x0c])));
    }

    #[test]
    fn plain_string_on_colour_field_is_raw_bytes() {
        let style: StyleObjectValue = convert(&style! { "stroke_color" => "ab" }).unwrap();
        assert_eq!(style.stroke_color, Some(Color(b"ab".to_vec())));
    }

    #[test]
    fn odd_length_hex_is_an_invalid_colour() {
        let err = convert::<StyleObjectValue>(&style! { "fill_color" => "#fff" }).unwrap_err();
        assert!(matches!(err, StyleError::InvalidColor { ref field, .. } if field == "fill_color"));
    }

    #[test]
    fn every_kind_converts_with_matching_tag() {
        let style: StyleStreamValue = convert(&style! {
            "font_family" => "mono",
            "stroked" => true,
            "opacity" => 0.5_f32,
            "point_color_domain" => vec![0.0_f32, 10.0],
            "radius_pixels" => 4_u32,
            "point_color_mode" => PointColorMode::Elevation,
        })
        .unwrap();
        assert_eq!(style.font_family.as_deref(), Some("mono"));
        assert_eq!(style.stroked, Some(true));
        assert_eq!(style.opacity, Some(0.5));
        assert_eq!(style.point_color_domain, Some(vec![0.0, 10.0]));
        assert_eq!(style.radius_pixels, Some(4));
        assert_eq!(style.point_color_mode, Some(PointColorMode::Elevation));
        assert_eq!(style.fill_color, None);
    }

    #[test]
    fn tag_mismatch_names_field_and_kinds() {
        let err = convert::<StyleStreamValue>(&style! { "filled" => 1_u32 }).unwrap_err();
        match err {
            StyleError::TypeMismatch { field, expected, found } => {
                assert_eq!(field, "filled");
                assert_eq!(expected, FieldKind::Bool);
                assert_eq!(found, "uint32");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn float_does_not_coerce_to_uint() {
        let err = convert::<StyleStreamValue>(&style! { "font_weight" => 400.0 }).unwrap_err();
        assert!(matches!(err, StyleError::TypeMismatch { expected: FieldKind::UInt32, .. }));
    }

    #[test]
    fn unknown_enum_tag_is_rejected() {
        let mut map = StyleMap::new();
        map.insert("text_anchor".into(), StyleValue::Enum(12));
        let err = convert::<StyleObjectValue>(&map).unwrap_err();
        assert!(matches!(err, StyleError::UnknownEnumValue { .. }));
    }

    #[test]
    fn object_style_rejects_stream_only_fields() {
        let err = convert::<StyleObjectValue>(&style! { "opacity" => 1.0 }).unwrap_err();
        assert!(matches!(err, StyleError::UnknownField { message: "StyleObjectValue", .. }));
    }

    #[test]
    fn empty_map_is_no_style() {
        assert_eq!(convert_optional::<StyleObjectValue>(&style! {}).unwrap(), None);
    }

    #[test]
    fn attributes_rehex_colours() {
        let style: StyleObjectValue =
            convert(&style! { "fill_color" => "#FF8000", "text_anchor" => TextAnchor::End }).unwrap();
        let attrs = style_to_attributes(&style).unwrap();
        assert_eq!(attrs["fill_color"], "#ff8000");
        assert_eq!(attrs["text_anchor"], "END");
        assert_eq!(attrs.len(), 2);
    }
}
