// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]

use xviz_proto::wire::{decode_binary, decode_json, encode_binary, encode_json};
use xviz_proto::{
    Envelope, Image, Point, PrimitiveState, StateUpdate, StreamSet, TimeSeriesState, UpdateType,
    Values,
};

fn frame_with_defaults() -> StateUpdate {
    let mut set = StreamSet { timestamp: 0.0, ..Default::default() };
    set.primitives.insert(
        "/points".into(),
        PrimitiveState {
            points: vec![Point { base: None, points: vec![0.0, 0.0, 0.0], colors: vec![] }],
            images: vec![Image { data: vec![0xde, 0xad, 0xbe, 0xef], ..Default::default() }],
            ..Default::default()
        },
    );
    set.time_series.push(TimeSeriesState {
        timestamp: 0.0,
        object_id: String::new(),
        streams: vec!["/speed".into()],
        values: Some(Values { int32s: vec![0], ..Default::default() }),
    });
    StateUpdate { update_type: UpdateType::Snapshot, updates: vec![set] }
}

#[test]
fn json_prints_default_scalars() {
    let text = encode_json(&Envelope::StateUpdate(frame_with_defaults())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    let frame = &value["data"]["updates"][0];
    assert_eq!(frame["timestamp"], 0.0);
    assert_eq!(frame["time_series"][0]["object_id"], "");
    assert_eq!(frame["time_series"][0]["values"]["int32s"][0], 0);
    assert_eq!(frame["primitives"]["/points"]["polygons"], serde_json::json!([]));
}

#[test]
fn json_decode_reproduces_defaults() {
    let env = Envelope::StateUpdate(frame_with_defaults());
    let text = encode_json(&env).unwrap();
    assert_eq!(decode_json(&text).unwrap(), env);
}

#[test]
fn image_bytes_are_base64_in_json() {
    let text = encode_json(&Envelope::StateUpdate(frame_with_defaults())).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["data"]["updates"][0]["primitives"]["/points"]["images"][0]["data"], "3q2+7w==");
}

#[test]
fn binary_decode_reproduces_message() {
    let env = Envelope::StateUpdate(frame_with_defaults());
    let bytes = encode_binary(&env).unwrap();
    assert_eq!(decode_binary(&bytes).unwrap(), env);
}
