// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Builder error type.

use thiserror::Error;
use xviz_proto::{Category, TreeTableColumnType, WireError};

use crate::style::StyleError;

/// Errors raised while building or encoding a message.
///
/// Every variant is reported at the call that caused it; nothing is coerced
/// or silently dropped.
#[derive(Debug, Error)]
pub enum BuildError {
    /// `op` is not legal for the stream's current category.
    #[error("stream {stream}: {op} is not allowed for category {category}")]
    CategoryMismatch {
        /// Stream id.
        stream: String,
        /// Rejected operation.
        op: &'static str,
        /// Category in force when the call was made.
        category: Category,
    },
    /// A stream's category is immutable once set.
    #[error("stream {stream}: category is already {current}, cannot change it to {requested}")]
    CategoryAlreadySet {
        /// Stream id.
        stream: String,
        /// Category already recorded.
        current: Category,
        /// Category the caller asked for.
        requested: Category,
    },
    /// The unset sentinel was passed where a concrete enum value is required.
    #[error("{target}: {enum_name} must not be the unset sentinel")]
    UnsetEnum {
        /// Stream or column the value was meant for.
        target: String,
        /// Enum type name.
        enum_name: &'static str,
    },
    /// Style map conversion failed.
    #[error("{target}: {source}")]
    Style {
        /// Owner of the style (stream, class or primitive).
        target: String,
        /// Underlying conversion error.
        source: StyleError,
    },
    /// A tree-table row does not have one value per column.
    #[error("tree table on {stream}: row {row} has {found} values for {expected} columns")]
    RowArity {
        /// Stream id.
        stream: String,
        /// Row id.
        row: i32,
        /// Column count.
        expected: usize,
        /// Values supplied.
        found: usize,
    },
    /// A tree-table cell does not match its column's declared type.
    #[error("tree table on {stream}: column {column:?} of row {row} holds {found}, expected {expected}")]
    CellTypeMismatch {
        /// Stream id.
        stream: String,
        /// Column display text.
        column: String,
        /// Row id.
        row: i32,
        /// Type of the supplied value.
        found: TreeTableColumnType,
        /// Declared column type.
        expected: TreeTableColumnType,
    },
    /// Point colours must be four bytes (RGBA) per point.
    #[error("points on {stream}: {colors} colour bytes for {points} points, need 4 per point")]
    PointColorCount {
        /// Stream id.
        stream: String,
        /// Colour bytes supplied.
        colors: usize,
        /// Points in the cloud.
        points: usize,
    },
    /// A time series sample carries exactly one value.
    #[error("time series on {stream} already holds a value")]
    DuplicateTimeSeriesValue {
        /// Stream id.
        stream: String,
    },
    /// The root container of a panel must be named after the panel.
    #[error("panel {panel}: root container must be named {panel:?}, got {name:?}")]
    PanelNameMismatch {
        /// Panel key.
        panel: String,
        /// Name the caller supplied.
        name: String,
    },
    /// Data access on a sub-builder that is not bound.
    #[error("{builder} builder is not started")]
    NotStarted {
        /// Builder family.
        builder: &'static str,
    },
    /// `start` on a sub-builder that is already bound.
    #[error("{builder} builder is already bound to {key}")]
    AlreadyStarted {
        /// Builder family.
        builder: &'static str,
        /// Key the builder is bound to.
        key: String,
    },
    /// A panel tree could not be folded into attributes.
    #[error("panel {panel}: cannot encode layout: {source}")]
    PanelEncode {
        /// Panel key.
        panel: String,
        /// Underlying JSON error.
        source: serde_json::Error,
    },
    /// Envelope encoding failed.
    #[error(transparent)]
    Wire(#[from] WireError),
}
