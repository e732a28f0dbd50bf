// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Fluent builders for XVIZ messages.
//!
//! [`MetadataBuilder`] declares streams (category, type, coordinate frame,
//! styles) and UI panels; [`StateUpdateBuilder`] fills one update frame with
//! poses, primitives, time series samples and tree tables. Both hand out
//! sub-builders that borrow the parent mutably, so at most one sub-builder
//! per family is open at a time and every edit lands directly in the message
//! being built.
//!
//! Invalid input is rejected at the call that supplies it with a
//! [`BuildError`]; nothing is coerced. Finished messages are wrapped in
//! [`Message`] for JSON or `PBE1` binary encoding.

pub mod error;
pub mod message;
pub mod metadata;
pub mod slot;
pub mod state_update;
pub mod style;
pub mod tree_table;

pub use error::BuildError;
pub use message::{Message, MessageType};
pub use metadata::{
    kind, CategoryBuilder, CategoryMarker, ContainerBuilder, MetadataBuilder, ScalarCategory,
    StreamMetadataBuilder, StreamType, UiPanelBuilder, DEFAULT_VERSION,
};
pub use state_update::{
    PoseBuilder, PrimitiveBuilder, Shape, ShapeBuilder, StateUpdateBuilder, TimeSeriesBuilder,
    TimeSeriesValue, UiPrimitiveBuilder, ROOT_PARENT,
};
pub use style::{StyleError, StyleMap, StyleValue};
pub use tree_table::TreeTableValue;
