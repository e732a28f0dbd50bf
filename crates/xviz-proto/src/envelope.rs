// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed envelope: a type tag plus exactly one payload message.

use serde::{Deserialize, Serialize};

use crate::metadata::Metadata;
use crate::state::StateUpdate;

/// Type tag of a [`Metadata`] payload.
pub const METADATA_TYPE: &str = "xviz/metadata";
/// Type tag of a [`StateUpdate`] payload.
pub const STATE_UPDATE_TYPE: &str = "xviz/state_update";

/// Owned envelope, as produced by decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Envelope {
    /// Stream metadata.
    #[serde(rename = "xviz/metadata")]
    Metadata(Metadata),
    /// Per-frame state.
    #[serde(rename = "xviz/state_update")]
    StateUpdate(StateUpdate),
}

impl Envelope {
    /// Type tag carried on the wire.
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::Metadata(_) => METADATA_TYPE,
            Self::StateUpdate(_) => STATE_UPDATE_TYPE,
        }
    }

    /// Borrowed view suitable for encoding.
    pub const fn borrowed(&self) -> EnvelopeRef<'_> {
        match self {
            Self::Metadata(m) => EnvelopeRef::Metadata(m),
            Self::StateUpdate(s) => EnvelopeRef::StateUpdate(s),
        }
    }
}

impl From<Metadata> for Envelope {
    fn from(value: Metadata) -> Self {
        Self::Metadata(value)
    }
}

impl From<StateUpdate> for Envelope {
    fn from(value: StateUpdate) -> Self {
        Self::StateUpdate(value)
    }
}

/// Borrowed envelope; encodes identically to [`Envelope`] without cloning
/// the payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum EnvelopeRef<'a> {
    /// Stream metadata.
    #[serde(rename = "xviz/metadata")]
    Metadata(&'a Metadata),
    /// Per-frame state.
    #[serde(rename = "xviz/state_update")]
    StateUpdate(&'a StateUpdate),
}

impl EnvelopeRef<'_> {
    /// Type tag carried on the wire.
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::Metadata(_) => METADATA_TYPE,
            Self::StateUpdate(_) => STATE_UPDATE_TYPE,
        }
    }
}

impl<'a> From<&'a Metadata> for EnvelopeRef<'a> {
    fn from(value: &'a Metadata) -> Self {
        Self::Metadata(value)
    }
}

impl<'a> From<&'a StateUpdate> for EnvelopeRef<'a> {
    fn from(value: &'a StateUpdate) -> Self {
        Self::StateUpdate(value)
    }
}
