// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(clippy::unwrap_used)]
#![allow(clippy::float_cmp)]
#![allow(clippy::panic)]

use xviz_builder::{style, BuildError, StateUpdateBuilder, TreeTableValue};
use xviz_proto::wire::{decode_binary, decode_json};
use xviz_proto::{Envelope, TreeTableColumnType, UpdateType};

#[test]
fn polygon_vertices_are_flattened_in_order() {
    let mut builder = StateUpdateBuilder::new();
    builder
        .primitive("/shape")
        .unwrap()
        .polygon(&[[10.0, 14.0, 0.0], [7.0, 10.0, 0.0], [13.0, 6.0, 0.0]])
        .id("object-1");
    let update = builder.finish();

    let shape = &update.updates[0].primitives["/shape"];
    assert_eq!(shape.polygons.len(), 1);
    assert_eq!(shape.polygons[0].vertices, vec![10.0, 14.0, 0.0, 7.0, 10.0, 0.0, 13.0, 6.0, 0.0]);
    assert_eq!(shape.polygons[0].base.as_ref().unwrap().object_id, "object-1");
}

#[test]
fn rejected_row_leaves_earlier_rows() {
    let mut builder = StateUpdateBuilder::new();
    let table = builder
        .ui_primitive("/table")
        .unwrap()
        .column("id", TreeTableColumnType::Int32, "")
        .unwrap()
        .column("val", TreeTableColumnType::Double, "m")
        .unwrap()
        .row(0, vec![1.into(), 0.5.into()])
        .unwrap();
    let err = table.row(1, vec![1.into(), "x".into()]).unwrap_err();
    match err {
        BuildError::CellTypeMismatch { column, row, found, expected, .. } => {
            assert_eq!(column, "val");
            assert_eq!(row, 1);
            assert_eq!(found, TreeTableColumnType::String);
            assert_eq!(expected, TreeTableColumnType::Double);
        }
        other => panic!("unexpected error: {other}"),
    }

    let update = builder.finish();
    let table = update.updates[0].ui_primitives["/table"].treetable.as_ref().unwrap();
    assert_eq!(table.nodes.len(), 1);
    assert_eq!(table.nodes[0].column_values, vec!["1".to_string(), "0.5".to_string()]);
    assert_eq!(table.nodes[0].parent, 0);
}

#[test]
fn row_arity_and_unset_column_type_are_rejected() {
    let mut builder = StateUpdateBuilder::new();
    let err = builder
        .ui_primitive("/table")
        .unwrap()
        .column("flag", TreeTableColumnType::Boolean, "")
        .unwrap()
        .row(0, vec![])
        .unwrap_err();
    assert!(matches!(err, BuildError::RowArity { expected: 1, found: 0, .. }));

    let err = builder.ui_primitive("/table").unwrap().column("x", TreeTableColumnType::Invalid, "").unwrap_err();
    assert!(matches!(err, BuildError::UnsetEnum { .. }));

    builder
        .ui_primitive("/table")
        .unwrap()
        .row_with_parent(2, 1, vec![TreeTableValue::Bool(true)])
        .unwrap();
    let update = builder.finish();
    let node = &update.updates[0].ui_primitives["/table"].treetable.as_ref().unwrap().nodes[0];
    assert_eq!((node.id, node.parent), (2, 1));
    assert_eq!(node.column_values, vec!["true".to_string()]);
}

#[test]
fn second_time_series_value_is_rejected() {
    let mut builder = StateUpdateBuilder::new();
    let err = builder.time_series("/speed").unwrap().value(1.5).unwrap().value(2.5).unwrap_err();
    assert!(matches!(err, BuildError::DuplicateTimeSeriesValue { ref stream } if stream == "/speed"));
    let update = builder.finish();
    assert_eq!(update.updates[0].time_series[0].values.as_ref().unwrap().doubles, vec![1.5]);
}

#[test]
fn failed_shape_is_not_committed() {
    let mut builder = StateUpdateBuilder::new();
    builder.primitive("/objects").unwrap().circle([0.0; 3], 1.0).id("a");
    let err = builder
        .primitive("/objects")
        .unwrap()
        .circle([2.0; 3], 1.0)
        .id("b")
        .style(&style! { "fill_color" => "#zz0000" })
        .unwrap_err();
    assert!(matches!(err, BuildError::Style { .. }));

    let update = builder.finish();
    let circles = &update.updates[0].primitives["/objects"].circles;
    assert_eq!(circles.len(), 1);
    assert_eq!(circles[0].base.as_ref().unwrap().object_id, "a");
}

#[test]
fn state_update_round_trips_with_defaults() {
    let mut builder = StateUpdateBuilder::new();
    builder.update_type(UpdateType::Append).timestamp(0.0);
    builder.pose("/vehicle_pose").unwrap().timestamp(0.0).position(0.0, 0.0, 0.0).orientation(0.0, 0.0, 0.0);
    builder
        .primitive("/objects")
        .unwrap()
        .circle([1.0, 2.0, 0.0], 0.5)
        .style(&style! { "fill_color" => "#ff000080", "stroke_width" => 0.0 })
        .unwrap()
        .end()
        .points(&[[0.0; 3]])
        .colors_rgba(&[[0, 0, 0, 0]])
        .unwrap()
        .end()
        .image(vec![0, 1, 2])
        .dimensions(0, 0);
    builder.time_series("/flag").unwrap().timestamp(0.0).value(false).unwrap().id("");
    builder
        .ui_primitive("/table")
        .unwrap()
        .column("n", TreeTableColumnType::Int32, "")
        .unwrap()
        .row(0, vec![0.into()])
        .unwrap();
    let message = builder.message();

    let json = message.to_json_string().unwrap();
    assert_eq!(decode_json(&json).unwrap(), Envelope::StateUpdate(message.data().clone()));
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["type"], "xviz/state_update");
    assert_eq!(value["data"]["update_type"], "APPEND");
    assert_eq!(value["data"]["updates"][0]["timestamp"], 0.0);
    let circle = &value["data"]["updates"][0]["primitives"]["/objects"]["circles"][0];
    assert_eq!(circle["base"]["style"]["fill_color"], "#ff000080");

    let frame = message.to_binary().unwrap();
    assert_eq!(decode_binary(&frame).unwrap(), message.into_envelope());
}

#[test]
fn new_frame_after_finish() {
    let mut builder = StateUpdateBuilder::new();
    builder.timestamp(1.0);
    builder.pose("/p").unwrap().position(1.0, 1.0, 1.0);
    let first = builder.finish();
    builder.timestamp(2.0);
    let second = builder.finish();
    assert_eq!(first.updates[0].poses.len(), 1);
    assert_eq!(second.updates[0].timestamp, 2.0);
    assert!(second.updates[0].poses.is_empty());
}
