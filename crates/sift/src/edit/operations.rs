//! Edit operations expressed against view positions.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::Cell;

/// An edit made against a view.
///
/// Positions index into the view that was on screen, not into the dataset.
/// They are translated to row identities only during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum EditOperation {
    /// Set one cell.
    UpdateCell {
        position: usize,
        column: String,
        value: Cell,
    },

    /// Insert a new row so that it follows view row `after - 1`.
    /// Columns missing from `values` are null.
    InsertRow {
        after: usize,
        #[serde(default)]
        values: IndexMap<String, Cell>,
    },

    /// Delete one row.
    DeleteRow { position: usize },
}

impl EditOperation {
    /// Update a cell at a view position.
    pub fn update(position: usize, column: impl Into<String>, value: impl Into<Cell>) -> Self {
        EditOperation::UpdateCell {
            position,
            column: column.into(),
            value: value.into(),
        }
    }

    /// Insert a row after a view position.
    pub fn insert<I, K, V>(after: usize, values: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Cell>,
    {
        EditOperation::InsertRow {
            after,
            values: values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Delete the row at a view position.
    pub fn delete(position: usize) -> Self {
        EditOperation::DeleteRow { position }
    }

    /// Get a human-readable description of the operation.
    pub fn description(&self) -> String {
        match self {
            EditOperation::UpdateCell {
                position,
                column,
                value,
            } => format!("Set '{}' at view row {} to '{}'", column, position, value),
            EditOperation::InsertRow { after, values } => {
                format!("Insert row at view position {} ({} values)", after, values.len())
            }
            EditOperation::DeleteRow { position } => format!("Delete view row {}", position),
        }
    }
}
