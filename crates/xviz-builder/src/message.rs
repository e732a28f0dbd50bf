// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Finished messages and their wire encodings.

use xviz_proto::{wire, Envelope, EnvelopeRef, Metadata, StateUpdate};

use crate::error::BuildError;

/// A top-level message that can be wrapped in an envelope.
pub trait MessageType: Sized {
    /// Envelope type tag.
    const TYPE: &'static str;

    /// Borrowed envelope around `self`.
    fn envelope(&self) -> EnvelopeRef<'_>;

    /// Owned envelope around `self`.
    fn into_envelope(self) -> Envelope;
}

impl MessageType for Metadata {
    const TYPE: &'static str = xviz_proto::METADATA_TYPE;

    fn envelope(&self) -> EnvelopeRef<'_> {
        EnvelopeRef::Metadata(self)
    }

    fn into_envelope(self) -> Envelope {
        Envelope::Metadata(self)
    }
}

impl MessageType for StateUpdate {
    const TYPE: &'static str = xviz_proto::STATE_UPDATE_TYPE;

    fn envelope(&self) -> EnvelopeRef<'_> {
        EnvelopeRef::StateUpdate(self)
    }

    fn into_envelope(self) -> Envelope {
        Envelope::StateUpdate(self)
    }
}

/// A finished message ready for encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Message<T> {
    data: T,
}

impl<T: MessageType> Message<T> {
    /// Wraps a finished message.
    pub const fn new(data: T) -> Self {
        Self { data }
    }

    /// The wrapped message.
    pub const fn data(&self) -> &T {
        &self.data
    }

    /// Unwraps the message.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Envelope type tag.
    pub const fn type_tag(&self) -> &'static str {
        T::TYPE
    }

    /// `{"type": ..., "data": ...}` with schema field names.
    pub fn to_json_string(&self) -> Result<String, BuildError> {
        Ok(wire::encode_json(&self.data.envelope())?)
    }

    /// `PBE1` followed by the CBOR envelope.
    pub fn to_binary(&self) -> Result<Vec<u8>, BuildError> {
        Ok(wire::encode_binary(&self.data.envelope())?)
    }

    /// Owned envelope.
    pub fn into_envelope(self) -> Envelope {
        self.data.into_envelope()
    }
}

impl<T: MessageType> From<T> for Message<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use xviz_proto::{UpdateType, MAGIC};

    #[test]
    fn json_carries_type_and_data() {
        let message = Message::new(StateUpdate { update_type: UpdateType::Snapshot, updates: Vec::new() });
        let json: serde_json::Value = serde_json::from_str(&message.to_json_string().unwrap()).unwrap();
        assert_eq!(json["type"], "xviz/state_update");
        assert_eq!(json["data"]["update_type"], "SNAPSHOT");
        assert_eq!(message.type_tag(), "xviz/state_update");
    }

    #[test]
    fn binary_is_magic_prefixed_and_decodes() {
        let meta = Metadata { version: "2.0.0".into(), ..Metadata::default() };
        let message = Message::new(meta.clone());
        let frame = message.to_binary().unwrap();
        assert_eq!(frame[..4], MAGIC);
        assert_eq!(wire::decode_binary(&frame).unwrap(), Envelope::Metadata(meta));
    }
}
