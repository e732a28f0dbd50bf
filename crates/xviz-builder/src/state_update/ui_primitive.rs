// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Tree-table builder for UI_PRIMITIVE streams.

use xviz_proto::{TreeTable, TreeTableColumn, TreeTableColumnType, TreeTableNode, UiPrimitiveState};

use crate::error::BuildError;
use crate::tree_table::TreeTableValue;

/// Parent id of top-level rows.
pub const ROOT_PARENT: i32 = 0;

/// Builder over one stream's tree table.
#[derive(Debug)]
pub struct UiPrimitiveBuilder<'a> {
    stream: &'a str,
    table: &'a mut TreeTable,
}

impl<'a> UiPrimitiveBuilder<'a> {
    pub(crate) fn new(stream: &'a str, state: &'a mut UiPrimitiveState) -> Self {
        Self { stream, table: state.treetable.get_or_insert_with(TreeTable::default) }
    }

    /// Appends a column definition.
    pub fn column(
        self,
        display_text: impl Into<String>,
        column_type: TreeTableColumnType,
        unit: impl Into<String>,
    ) -> Result<Self, BuildError> {
        let display_text = display_text.into();
        if !column_type.is_set() {
            return Err(BuildError::UnsetEnum {
                target: format!("column {display_text:?} of {}", self.stream),
                enum_name: "TreeTableColumnType",
            });
        }
        self.table.columns.push(TreeTableColumn { display_text, column_type, unit: unit.into() });
        Ok(self)
    }

    /// Appends a top-level row.
    pub fn row(self, id: i32, values: Vec<TreeTableValue>) -> Result<Self, BuildError> {
        self.row_with_parent(id, ROOT_PARENT, values)
    }

    /// Appends a row under `parent`. Values must match the columns
    /// positionally, in count and in type; a rejected row is not stored.
    pub fn row_with_parent(self, id: i32, parent: i32, values: Vec<TreeTableValue>) -> Result<Self, BuildError> {
        let columns = &self.table.columns;
        if values.len() != columns.len() {
            return Err(BuildError::RowArity {
                stream: self.stream.to_owned(),
                row: id,
                expected: columns.len(),
                found: values.len(),
            });
        }
        if let Some((column, value)) = columns.iter().zip(&values).find(|(c, v)| !v.matches(c.column_type)) {
            return Err(BuildError::CellTypeMismatch {
                stream: self.stream.to_owned(),
                column: column.display_text.clone(),
                row: id,
                found: value.column_type(),
                expected: column.column_type,
            });
        }
        let column_values = values.iter().map(ToString::to_string).collect();
        self.table.nodes.push(TreeTableNode { id, parent, column_values });
        Ok(self)
    }
}
