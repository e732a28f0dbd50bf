// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! State update builder: one update frame of per-stream payloads.

mod pose;
mod primitive;
mod time_series;
mod ui_primitive;

use tracing::{debug, warn};
use xviz_proto::{StateUpdate, StreamSet, TimeSeriesState, UpdateType, Values};

pub use pose::PoseBuilder;
pub use primitive::{PrimitiveBuilder, Shape, ShapeBuilder};
pub use time_series::{TimeSeriesBuilder, TimeSeriesValue};
pub use ui_primitive::{UiPrimitiveBuilder, ROOT_PARENT};

use crate::error::BuildError;
use crate::message::Message;
use crate::slot::Slot;

/// Builds a [`StateUpdate`] carrying a single update frame.
///
/// Selecting a stream returns a sub-builder that borrows the builder
/// mutably; selecting another stream (or calling [`finish`](Self::finish))
/// closes it.
///
/// ```
/// use xviz_builder::StateUpdateBuilder;
///
/// # fn main() -> Result<(), xviz_builder::BuildError> {
/// let mut builder = StateUpdateBuilder::new();
/// builder.timestamp(1000.0);
/// builder.pose("/vehicle_pose")?.position(1.0, 2.0, 0.0);
/// builder
///     .primitive("/object/shape")?
///     .polygon(&[[10.0, 14.0, 0.0], [7.0, 10.0, 0.0], [13.0, 6.0, 0.0]])
///     .id("object-1");
/// builder.time_series("/speed")?.timestamp(1000.0).value(12.5)?;
/// let update = builder.finish();
/// assert_eq!(update.updates.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct StateUpdateBuilder {
    update_type: UpdateType,
    frame: StreamSet,
    pose: Slot<String>,
    primitive: Slot<String>,
    time_series: Slot<usize>,
    ui_primitive: Slot<String>,
}

impl Default for StateUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StateUpdateBuilder {
    /// Empty SNAPSHOT builder.
    pub fn new() -> Self {
        Self {
            update_type: UpdateType::Snapshot,
            frame: StreamSet::default(),
            pose: Slot::new("pose"),
            primitive: Slot::new("primitive"),
            time_series: Slot::new("time series"),
            ui_primitive: Slot::new("ui primitive"),
        }
    }

    /// Sets the update kind.
    pub fn update_type(&mut self, update_type: UpdateType) -> &mut Self {
        self.update_type = update_type;
        self
    }

    /// Sets the frame timestamp.
    pub fn timestamp(&mut self, timestamp: f64) -> &mut Self {
        self.frame.timestamp = timestamp;
        self
    }

    /// Selects (creating if needed) the pose of `stream_id`.
    pub fn pose(&mut self, stream_id: impl Into<String>) -> Result<PoseBuilder<'_>, BuildError> {
        let pose = self.pose.open(stream_id.into(), &mut self.frame.poses)?;
        Ok(PoseBuilder::new(pose))
    }

    /// Selects (creating if needed) the geometry of `stream_id`.
    pub fn primitive(&mut self, stream_id: impl Into<String>) -> Result<PrimitiveBuilder<'_>, BuildError> {
        let state = self.primitive.open(stream_id.into(), &mut self.frame.primitives)?;
        Ok(PrimitiveBuilder::new(self.primitive.key()?, state))
    }

    /// Appends a new sample for `stream_id`. A sample that is closed before
    /// it receives a [`value`](TimeSeriesBuilder::value) is discarded.
    pub fn time_series(&mut self, stream_id: impl Into<String>) -> Result<TimeSeriesBuilder<'_>, BuildError> {
        self.end_time_series();
        let index = self.frame.time_series.len();
        let entry = self.time_series.open(index, &mut self.frame.time_series)?;
        *entry = TimeSeriesState { streams: vec![stream_id.into()], ..TimeSeriesState::default() };
        Ok(TimeSeriesBuilder::new(entry))
    }

    /// Selects (creating if needed) the tree table of `stream_id`.
    pub fn ui_primitive(&mut self, stream_id: impl Into<String>) -> Result<UiPrimitiveBuilder<'_>, BuildError> {
        let state = self.ui_primitive.open(stream_id.into(), &mut self.frame.ui_primitives)?;
        Ok(UiPrimitiveBuilder::new(self.ui_primitive.key()?, state))
    }

    /// Ends every open sub-builder and returns the message. The builder is
    /// reset to an empty frame with the same update type.
    pub fn finish(&mut self) -> StateUpdate {
        self.end_all();
        let frame = std::mem::take(&mut self.frame);
        debug!(
            poses = frame.poses.len(),
            primitives = frame.primitives.len(),
            time_series = frame.time_series.len(),
            ui_primitives = frame.ui_primitives.len(),
            "state update finished"
        );
        StateUpdate { update_type: self.update_type, updates: vec![frame] }
    }

    /// [`finish`](Self::finish), wrapped for encoding.
    pub fn message(&mut self) -> Message<StateUpdate> {
        Message::new(self.finish())
    }

    /// Drops the frame built so far and reverts to SNAPSHOT.
    pub fn reset(&mut self) {
        self.end_all();
        self.frame = StreamSet::default();
        self.update_type = UpdateType::Snapshot;
    }

    fn end_all(&mut self) {
        self.pose.end();
        self.primitive.end();
        self.end_time_series();
        self.ui_primitive.end();
    }

    fn end_time_series(&mut self) {
        let Some(index) = self.time_series.end() else {
            return;
        };
        let unset = self.frame.time_series.get(index).is_some_and(|entry| entry.values.as_ref().is_none_or(Values::is_empty));
        if unset {
            let entry = self.frame.time_series.remove(index);
            warn!(streams = ?entry.streams, "time series sample has no value; dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn reselecting_a_stream_appends_to_it() {
        let mut builder = StateUpdateBuilder::new();
        builder.primitive("/s").unwrap().circle([0.0; 3], 1.0);
        builder.pose("/p").unwrap().timestamp(1.0);
        builder.primitive("/s").unwrap().circle([1.0; 3], 2.0);
        let update = builder.finish();
        assert_eq!(update.updates[0].primitives["/s"].circles.len(), 2);
    }

    #[test]
    fn time_series_always_appends() {
        let mut builder = StateUpdateBuilder::new();
        builder.time_series("/v").unwrap().value(1).unwrap();
        builder.time_series("/v").unwrap().value(2).unwrap();
        let update = builder.finish();
        let series = &update.updates[0].time_series;
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].streams, vec!["/v".to_string()]);
        assert_eq!(series[1].values.as_ref().unwrap().int32s, vec![2]);
    }

    #[test]
    fn sample_without_value_is_not_emitted() {
        let mut builder = StateUpdateBuilder::new();
        builder.time_series("/v").unwrap().timestamp(1.0);
        builder.time_series("/w").unwrap().timestamp(2.0).value(true).unwrap();
        builder.time_series("/x").unwrap().timestamp(3.0);
        let update = builder.finish();
        let series = &update.updates[0].time_series;
        assert_eq!(series.len(), 1);
        assert_eq!(series[0].streams, vec!["/w".to_string()]);
        assert_eq!(series[0].values.as_ref().unwrap().bools, vec![true]);
    }

    #[test]
    fn pose_position_replaces() {
        let mut builder = StateUpdateBuilder::new();
        builder
            .pose("/p")
            .unwrap()
            .position(1.0, 2.0, 3.0)
            .position(4.0, 5.0, 6.0)
            .orientation(0.0, 0.0, 1.5)
            .map_origin(8.4, 49.0, 110.0);
        let update = builder.finish();
        let pose = &update.updates[0].poses["/p"];
        assert_eq!(pose.position, vec![4.0, 5.0, 6.0]);
        assert_eq!(pose.orientation, vec![0.0, 0.0, 1.5]);
        assert_eq!(pose.map_origin.unwrap().latitude, 49.0);
    }

    #[test]
    fn finish_reseeds_an_empty_frame() {
        let mut builder = StateUpdateBuilder::new();
        builder.update_type(UpdateType::Append).timestamp(5.0);
        builder.pose("/p").unwrap();
        let first = builder.finish();
        assert_eq!(first.update_type, UpdateType::Append);
        assert_eq!(first.updates[0].timestamp, 5.0);

        let second = builder.finish();
        assert_eq!(second.updates.len(), 1);
        assert!(second.updates[0].poses.is_empty());

        builder.reset();
        assert_eq!(builder.finish().update_type, UpdateType::Snapshot);
    }
}
