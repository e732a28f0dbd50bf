// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Time series sample builder.

use xviz_proto::{TimeSeriesState, Values};

use crate::error::BuildError;

/// A single time series value.
#[derive(Debug, Clone, PartialEq)]
pub enum TimeSeriesValue {
    /// Double.
    Double(f64),
    /// 32-bit integer.
    Int32(i32),
    /// Boolean.
    Bool(bool),
    /// String.
    String(String),
}

impl From<f64> for TimeSeriesValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<i32> for TimeSeriesValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<bool> for TimeSeriesValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for TimeSeriesValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for TimeSeriesValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

/// Builder over one appended time series sample.
#[derive(Debug)]
pub struct TimeSeriesBuilder<'a> {
    entry: &'a mut TimeSeriesState,
}

impl<'a> TimeSeriesBuilder<'a> {
    pub(crate) fn new(entry: &'a mut TimeSeriesState) -> Self {
        Self { entry }
    }

    /// Sample time in seconds.
    pub fn timestamp(self, timestamp: f64) -> Self {
        self.entry.timestamp = timestamp;
        self
    }

    /// Sets the sample value. A sample holds exactly one value.
    pub fn value(self, value: impl Into<TimeSeriesValue>) -> Result<Self, BuildError> {
        let values = self.entry.values.get_or_insert_with(Values::default);
        if !values.is_empty() {
            return Err(BuildError::DuplicateTimeSeriesValue {
                stream: self.entry.streams.first().cloned().unwrap_or_default(),
            });
        }
        match value.into() {
            TimeSeriesValue::Double(v) => values.doubles.push(v),
            TimeSeriesValue::Int32(v) => values.int32s.push(v),
            TimeSeriesValue::Bool(v) => values.bools.push(v),
            TimeSeriesValue::String(v) => values.strings.push(v),
        }
        Ok(self)
    }

    /// Object the sample describes.
    pub fn id(self, object_id: impl Into<String>) -> Self {
        self.entry.object_id = object_id.into();
        self
    }

    /// Shares the sample with another stream.
    pub fn stream(self, stream_id: impl Into<String>) -> Self {
        self.entry.streams.push(stream_id.into());
        self
    }
}
