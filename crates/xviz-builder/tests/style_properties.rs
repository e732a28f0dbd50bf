// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use xviz_builder::style::{convert, style_to_attributes};
use xviz_builder::{StyleError, StyleMap, StyleValue};
use xviz_proto::{StyleObjectValue, StyleSchema, StyleStreamValue};

fn value_strategy() -> impl Strategy<Value = StyleValue> {
    prop_oneof![
        any::<u32>().prop_map(StyleValue::UInt),
        any::<f32>().prop_map(StyleValue::Float),
        "[a-z#0-9]{0,8}".prop_map(StyleValue::Str),
        any::<bool>().prop_map(StyleValue::Bool),
        (0..4_i32).prop_map(StyleValue::Enum),
    ]
}

proptest! {
    #[test]
    fn unknown_keys_never_produce_a_message(
        key in "[a-z_]{1,24}",
        value in value_strategy(),
    ) {
        prop_assume!(StyleStreamValue::field(&key).is_none());
        let mut map = StyleMap::new();
        map.insert("stroke_width".into(), StyleValue::Float(1.0));
        map.insert(key.clone(), value);
        let err = convert::<StyleStreamValue>(&map).unwrap_err();
        let is_unknown = matches!(err, StyleError::UnknownField { field, .. } if field == key);
        prop_assert!(is_unknown);
    }

    #[test]
    fn hex_colours_round_trip_through_attributes(rgb in any::<[u8; 3]>()) {
        let text = format!("#{}", hex::encode(rgb));
        let mut map = StyleMap::new();
        map.insert("stroke_color".into(), StyleValue::from(text.as_str()));
        let style: StyleObjectValue = convert(&map).unwrap();
        prop_assert_eq!(style.stroke_color.as_ref().unwrap().as_bytes(), &rgb[..]);
        let attrs = style_to_attributes(&style).unwrap();
        prop_assert_eq!(attrs["stroke_color"].as_str(), Some(text.as_str()));
    }
}
