// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Synthetic live scenario: a static vehicle, a growing point column, a
//! circle, an optional camera image and an acceleration trace.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time;
use tracing::{debug, info};
use xviz_builder::{
    kind, style, BuildError, Message, MetadataBuilder, StateUpdateBuilder, TreeTableValue,
};
use xviz_proto::{
    Category, CoordinateType, LayoutType, Metadata, PointColorMode, PrimitiveType, ScalarType,
    StateUpdate, TreeTableColumnType,
};

use crate::session::{Encoding, Link, Session, SessionError, SessionHandler, SessionRequest};

/// Vehicle pose stream.
pub const POSE_STREAM: &str = "/vehicle_pose";
/// Point column stream.
pub const POINTS_STREAM: &str = "/object/shape";
/// Circle stream.
pub const CIRCLES_STREAM: &str = "/object/circles";
/// Camera image stream.
pub const CAMERA_STREAM: &str = "/camera/images0";
/// Acceleration time series.
pub const ACCELERATION_STREAM: &str = "/vehicle/acceleration";
/// Object tree table.
pub const TABLE_STREAM: &str = "/object/table";

const MAX_POINTS: usize = 1000;

/// Frame producer shared by every demo session.
#[derive(Debug, Clone, Default)]
pub struct Scenario {
    image: Option<Arc<Vec<u8>>>,
    points: Vec<[f32; 3]>,
    height: f32,
    tick: u32,
}

impl Scenario {
    /// Scenario with ten seed points; `image` is sent on the camera stream
    /// every frame when present.
    pub fn new(image: Option<Arc<Vec<u8>>>) -> Self {
        let mut scenario = Self { image, ..Self::default() };
        for _ in 0..10 {
            scenario.push_point();
        }
        scenario
    }

    fn push_point(&mut self) {
        if self.points.len() == MAX_POINTS {
            self.points.clear();
            self.height = 0.0;
        }
        self.points.push([0.0, 0.0, self.height]);
        self.height += 1.0;
    }

    /// Stream declarations and UI panels.
    pub fn metadata() -> Result<Message<Metadata>, BuildError> {
        let mut builder = MetadataBuilder::new();
        builder.stream(POSE_STREAM)?.category_of::<kind::Pose>()?;
        builder
            .stream(POINTS_STREAM)?
            .category_of::<kind::Primitive>()?
            .primitive_type(PrimitiveType::Point)?
            .coordinate(CoordinateType::VehicleRelative)
            .stream_style(&style! {
                "fill_color" => "#ffffff",
                "point_color_mode" => PointColorMode::DistanceToVehicle,
                "radius_pixels" => 3_u32,
            })?;
        builder
            .stream(CIRCLES_STREAM)?
            .category_of::<kind::Primitive>()?
            .primitive_type(PrimitiveType::Circle)?
            .stream_style(&style! { "fill_color" => "#ffffff" })?;
        builder
            .stream(CAMERA_STREAM)?
            .category(Category::Primitive)?
            .stream_type(PrimitiveType::Image)?;
        builder
            .stream(ACCELERATION_STREAM)?
            .category_of::<kind::TimeSeries>()?
            .scalar_type(ScalarType::Float)?
            .unit("m/s^2");
        builder.stream(TABLE_STREAM)?.category_of::<kind::UiPrimitive>()?;

        builder
            .ui("Camera")?
            .needed_stream(CAMERA_STREAM)
            .container("Camera", LayoutType::Vertical)?
            .video([CAMERA_STREAM]);
        builder
            .ui("Metrics")?
            .needed_stream(ACCELERATION_STREAM)
            .needed_stream(TABLE_STREAM)
            .container("Metrics", LayoutType::Vertical)?
            .container("metrics", LayoutType::Vertical)
            .metric("acceleration", "acceleration", [ACCELERATION_STREAM])
            .end_container()
            .tree_table("Objects", "tracked objects", TABLE_STREAM, true);
        builder.message()
    }

    /// Builds the next frame and advances the scenario.
    pub fn next_update(&mut self) -> Result<Message<StateUpdate>, BuildError> {
        self.push_point();
        let timestamp = f64::from(self.tick);

        let mut builder = StateUpdateBuilder::new();
        builder.timestamp(timestamp);
        builder.pose(POSE_STREAM)?.timestamp(timestamp).map_origin(0.0, 0.0, 0.0).orientation(0.0, 0.0, 0.0);
        builder.primitive(CIRCLES_STREAM)?.circle([1.0, 2.0, 3.0], 20.0).id("circle-0");
        builder.primitive(POINTS_STREAM)?.points(&self.points);
        if let Some(image) = &self.image {
            builder.primitive(CAMERA_STREAM)?.image(image.to_vec());
        }
        builder
            .time_series(ACCELERATION_STREAM)?
            .timestamp(timestamp)
            .value(f64::from(self.tick % 10))?
            .id("acceleration");
        builder
            .ui_primitive(TABLE_STREAM)?
            .column("id", TreeTableColumnType::Int32, "")?
            .column("height", TreeTableColumnType::Double, "m")?
            .row(1, vec![TreeTableValue::Int32(1), TreeTableValue::Double(f64::from(self.height))])?;

        self.tick = self.tick.wrapping_add(1);
        Ok(builder.message())
    }
}

/// Knobs for [`DemoHandler`].
#[derive(Debug, Clone)]
pub struct DemoOptions {
    /// Time between state updates.
    pub interval: Duration,
    /// Stop after this many updates; `None` streams until disconnect.
    pub frame_limit: Option<u64>,
    /// Encoding of state updates unless the client asks otherwise.
    pub encoding: Encoding,
    /// Camera image bytes.
    pub image: Option<Arc<Vec<u8>>>,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self { interval: Duration::from_secs(1), frame_limit: None, encoding: Encoding::Binary, image: None }
    }
}

/// Accepts every connection with a [`DemoSession`].
///
/// A `format=json` or `format=binary` query parameter overrides the
/// configured state-update encoding.
#[derive(Debug, Clone, Default)]
pub struct DemoHandler {
    options: DemoOptions,
}

impl DemoHandler {
    /// Handler with `options`.
    pub fn new(options: DemoOptions) -> Self {
        Self { options }
    }
}

impl SessionHandler for DemoHandler {
    fn session(&self, request: &SessionRequest) -> Option<Box<dyn Session>> {
        let encoding = match request.params.get("format").map(String::as_str) {
            Some("json") => Encoding::Json,
            Some("binary") => Encoding::Binary,
            _ => self.options.encoding,
        };
        let options = DemoOptions { encoding, ..self.options.clone() };
        Some(Box::new(DemoSession::new(options)))
    }
}

/// Sends metadata on connect, then one state update per interval.
#[derive(Debug)]
pub struct DemoSession {
    scenario: Scenario,
    options: DemoOptions,
    sent: u64,
}

impl DemoSession {
    /// Fresh session.
    pub fn new(options: DemoOptions) -> Self {
        Self { scenario: Scenario::new(options.image.clone()), options, sent: 0 }
    }

    /// State updates sent so far.
    pub const fn sent(&self) -> u64 {
        self.sent
    }
}

#[async_trait]
impl Session for DemoSession {
    async fn on_connect(&mut self, link: &Link) -> Result<(), SessionError> {
        let metadata = Scenario::metadata()?;
        link.send_message(&metadata, Encoding::Json).await?;
        info!(peer = %link.peer(), "metadata sent");
        Ok(())
    }

    async fn main(&mut self, link: &Link) -> Result<(), SessionError> {
        let mut interval = time::interval(self.options.interval);
        loop {
            if self.options.frame_limit.is_some_and(|limit| self.sent >= limit) {
                return Ok(());
            }
            tokio::select! {
                () = link.closed() => return Ok(()),
                _ = interval.tick() => {
                    let update = self.scenario.next_update()?;
                    link.send_message(&update, self.options.encoding).await?;
                    self.sent += 1;
                }
            }
        }
    }

    async fn on_disconnect(&mut self, link: &Link) {
        debug!(peer = %link.peer(), sent = self.sent, "demo session finished");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn metadata_declares_every_stream() {
        let metadata = Scenario::metadata().unwrap().into_data();
        assert_eq!(metadata.streams.len(), 6);
        assert_eq!(metadata.streams[ACCELERATION_STREAM].units, "m/s^2");
        assert_eq!(metadata.ui_config.len(), 2);
        let metrics = &metadata.ui_config["Metrics"];
        assert!(metrics.config.is_some());
        assert_eq!(metrics.needed_streams, vec![ACCELERATION_STREAM.to_owned(), TABLE_STREAM.to_owned()]);
    }

    #[test]
    fn updates_grow_the_point_column() {
        let mut scenario = Scenario::new(Some(Arc::new(vec![0x89, b'P', b'N', b'G'])));
        let first = scenario.next_update().unwrap().into_data();
        let second = scenario.next_update().unwrap().into_data();
        let points = |update: &StateUpdate| update.updates[0].primitives[POINTS_STREAM].points[0].points.len();
        assert_eq!(points(&first), 33);
        assert_eq!(points(&second), 36);
        assert_eq!(second.updates[0].primitives[CAMERA_STREAM].images.len(), 1);
        assert_eq!(second.updates[0].time_series[0].values.as_ref().unwrap().doubles, vec![1.0]);
    }
}
