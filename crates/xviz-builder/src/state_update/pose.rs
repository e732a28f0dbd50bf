// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pose builder.

use xviz_proto::{MapOrigin, Pose};

/// Builder over one stream's pose.
#[derive(Debug)]
pub struct PoseBuilder<'a> {
    pose: &'a mut Pose,
}

impl<'a> PoseBuilder<'a> {
    pub(crate) fn new(pose: &'a mut Pose) -> Self {
        Self { pose }
    }

    /// Pose time in seconds.
    pub fn timestamp(self, timestamp: f64) -> Self {
        self.pose.timestamp = timestamp;
        self
    }

    /// Geographic anchor.
    pub fn map_origin(self, longitude: f64, latitude: f64, altitude: f64) -> Self {
        self.pose.map_origin = Some(MapOrigin { longitude, latitude, altitude });
        self
    }

    /// Replaces the position.
    pub fn position(self, x: f64, y: f64, z: f64) -> Self {
        self.pose.position = vec![x, y, z];
        self
    }

    /// Replaces the orientation (radians).
    pub fn orientation(self, roll: f64, pitch: f64, yaw: f64) -> Self {
        self.pose.orientation = vec![roll, pitch, yaw];
        self
    }
}
