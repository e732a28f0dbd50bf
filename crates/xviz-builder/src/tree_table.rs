// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tree-table cell values.

use std::fmt;

use xviz_proto::TreeTableColumnType;

/// A typed tree-table cell.
///
/// Cells are stored on the wire as their [`Display`](fmt::Display)
/// rendering, which is locale independent.
#[derive(Debug, Clone, PartialEq)]
pub enum TreeTableValue {
    /// 32-bit signed integer.
    Int32(i32),
    /// Double precision float.
    Double(f64),
    /// String.
    String(String),
    /// Boolean, rendered `true` / `false`.
    Bool(bool),
}

impl TreeTableValue {
    /// Column type this value belongs in.
    pub const fn column_type(&self) -> TreeTableColumnType {
        match self {
            Self::Int32(_) => TreeTableColumnType::Int32,
            Self::Double(_) => TreeTableColumnType::Double,
            Self::String(_) => TreeTableColumnType::String,
            Self::Bool(_) => TreeTableColumnType::Boolean,
        }
    }

    /// `true` when the value may be stored in a column of type `column`.
    /// No numeric widening: an integer never fits a DOUBLE column.
    pub fn matches(&self, column: TreeTableColumnType) -> bool {
        self.column_type() == column
    }
}

impl fmt::Display for TreeTableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int32(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => f.write_str(v),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i32> for TreeTableValue {
    fn from(v: i32) -> Self {
        Self::Int32(v)
    }
}

impl From<f64> for TreeTableValue {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<&str> for TreeTableValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_owned())
    }
}

impl From<String> for TreeTableValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<bool> for TreeTableValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
