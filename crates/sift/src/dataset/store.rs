//! The base dataset: rows keyed by stable identity.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};
use crate::input::DataTable;
use crate::profile::TypeProfiler;

use super::cell::Cell;
use super::schema::Schema;

/// Stable row identity. Assigned at row creation and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowId(u64);

impl RowId {
    /// Wrap a raw identifier.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw identifier.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// One row of cells, positionally aligned with the schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    cells: Vec<Cell>,
}

impl Row {
    pub(crate) fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Get a cell by column position.
    pub fn get(&self, index: usize) -> Option<&Cell> {
        self.cells.get(index)
    }

    /// All cells in column order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }
}

/// Canonical row store.
///
/// Rows are kept in base order. Filtering never mutates a dataset; only
/// reconciliation does, and every reconciliation advances `version` by one.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    schema: Schema,
    rows: IndexMap<RowId, Row>,
    version: u64,
    next_id: u64,
}

impl Dataset {
    /// Create an empty dataset with the given schema.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            rows: IndexMap::new(),
            version: 0,
            next_id: 1,
        }
    }

    /// Build a dataset from typed rows, checking every value against the schema.
    pub fn from_rows(schema: Schema, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let mut dataset = Self::new(schema);

        for (row_idx, values) in rows.into_iter().enumerate() {
            if values.len() != dataset.schema.len() {
                return Err(SiftError::SchemaMismatch {
                    row: row_idx,
                    message: format!(
                        "expected {} values, found {}",
                        dataset.schema.len(),
                        values.len()
                    ),
                });
            }

            let mut cells = Vec::with_capacity(values.len());
            for (col_idx, value) in values.iter().enumerate() {
                let Some((name, profile)) = dataset.schema.column(col_idx) else {
                    continue;
                };
                let cell = profile.coerce(value).map_err(|e| SiftError::SchemaMismatch {
                    row: row_idx,
                    message: format!("column '{}': {}", name, e),
                })?;
                cells.push(cell);
            }

            dataset.push_row(Row::new(cells));
        }

        Ok(dataset)
    }

    /// Profile the columns of a raw table and convert it into a dataset.
    pub fn from_table(table: &DataTable, profiler: &TypeProfiler) -> Result<Self> {
        let mut schema = Schema::new();
        for (name, raw) in table.columns() {
            let values: Vec<&str> = raw.iter().map(String::as_str).collect();
            schema = schema.with_column(name, profiler.profile(name, &values)?);
        }

        let mut dataset = Self::new(schema);
        for row_idx in 0..table.len() {
            let mut cells = Vec::with_capacity(dataset.schema.len());
            for (col_idx, (name, profile)) in dataset.schema.iter().enumerate() {
                let value = table.value(row_idx, col_idx).unwrap_or("");
                let cell = profile.parse_raw(value).map_err(|e| SiftError::SchemaMismatch {
                    row: row_idx,
                    message: format!("column '{}': {}", name, e),
                })?;
                cells.push(cell);
            }
            dataset.push_row(Row::new(cells));
        }

        tracing::debug!(
            rows = dataset.len(),
            columns = dataset.schema.len(),
            "built dataset from table"
        );

        Ok(dataset)
    }

    /// The column schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Current version stamp.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row identities in base order.
    pub fn row_ids(&self) -> impl Iterator<Item = RowId> + '_ {
        self.rows.keys().copied()
    }

    /// Iterate over rows in base order.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(id, row)| (*id, row))
    }

    /// Whether a row with this identity exists.
    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Get a row by identity.
    pub fn row(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Get a cell by row identity and column name.
    pub fn get(&self, id: RowId, column: &str) -> Option<&Cell> {
        let col_idx = self.schema.index_of(column)?;
        self.rows.get(&id)?.get(col_idx)
    }

    /// Base position of a row.
    pub fn position(&self, id: RowId) -> Option<usize> {
        self.rows.get_index_of(&id)
    }

    /// All values of a column in base order.
    pub fn column_values(&self, column: &str) -> Option<impl Iterator<Item = &Cell>> {
        let col_idx = self.schema.index_of(column)?;
        Some(self.rows.values().filter_map(move |row| row.get(col_idx)))
    }

    /// Replace a cell, returning the previous value.
    pub(crate) fn set_cell(&mut self, id: RowId, col_idx: usize, cell: Cell) -> Option<Cell> {
        let slot = self.rows.get_mut(&id)?.cells.get_mut(col_idx)?;
        Some(std::mem::replace(slot, cell))
    }

    /// Remove a row, preserving the order of the rest.
    pub(crate) fn remove_row(&mut self, id: RowId) -> Option<Row> {
        self.rows.shift_remove(&id)
    }

    /// Append a row under a fresh identity.
    pub(crate) fn push_row(&mut self, row: Row) -> RowId {
        let id = self.allocate_id();
        self.rows.insert(id, row);
        id
    }

    /// Insert a row at a base position under a fresh identity.
    pub(crate) fn insert_row_at(&mut self, index: usize, row: Row) -> RowId {
        let id = self.allocate_id();
        let index = index.min(self.rows.len());
        self.rows.shift_insert(index, id, row);
        id
    }

    /// Advance the version stamp by one.
    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    fn allocate_id(&mut self) -> RowId {
        let id = RowId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{ColumnKind, TypeProfile};

    fn ages() -> Dataset {
        let schema = Schema::new().with_column("age", TypeProfile::numeric(17.0, 60.0));
        Dataset::from_rows(
            schema,
            vec![
                vec![Cell::Number(25.0)],
                vec![Cell::Number(40.0)],
                vec![Cell::Number(17.0)],
                vec![Cell::Number(60.0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_row_ids_start_at_one() {
        let dataset = ages();
        let ids: Vec<String> = dataset.row_ids().map(|id| id.to_string()).collect();

        assert_eq!(ids, vec!["r1", "r2", "r3", "r4"]);
        assert_eq!(dataset.version(), 0);
    }

    #[test]
    fn test_from_rows_rejects_wrong_width() {
        let schema = Schema::new().with_column("age", TypeProfile::numeric(0.0, 1.0));
        let err = Dataset::from_rows(schema, vec![vec![Cell::Null, Cell::Null]]).unwrap_err();

        assert!(matches!(err, SiftError::SchemaMismatch { row: 0, .. }));
    }

    #[test]
    fn test_from_rows_coerces_text() {
        let schema = Schema::new().with_column("age", TypeProfile::numeric(0.0, 100.0));
        let dataset = Dataset::from_rows(schema, vec![vec![Cell::text("42")]]).unwrap();

        assert_eq!(dataset.get(RowId::new(1), "age"), Some(&Cell::Number(42.0)));
    }

    #[test]
    fn test_identities_never_reused() {
        let mut dataset = ages();
        dataset.remove_row(RowId::new(4));
        let id = dataset.push_row(Row::new(vec![Cell::Number(30.0)]));

        assert_eq!(id, RowId::new(5));
    }

    #[test]
    fn test_insert_row_at_preserves_order() {
        let mut dataset = ages();
        let id = dataset.insert_row_at(1, Row::new(vec![Cell::Number(33.0)]));

        assert_eq!(dataset.position(id), Some(1));
        assert_eq!(dataset.position(RowId::new(2)), Some(2));
    }

    #[test]
    fn test_from_table_profiles_columns() {
        let table = DataTable::from_records(
            ["species", "width"],
            [
                ["setosa", "1.5"],
                ["setosa", "NA"],
                ["virginica", "2.0"],
                ["virginica", "1.8"],
            ],
        );
        let dataset = Dataset::from_table(&table, &TypeProfiler::new()).unwrap();

        assert_eq!(dataset.schema().profile("species").unwrap().kind, ColumnKind::Categorical);
        let width = dataset.schema().profile("width").unwrap();
        assert_eq!(width.kind, ColumnKind::Numeric);
        assert!(width.nullable);
        assert_eq!(dataset.get(RowId::new(2), "width"), Some(&Cell::Null));
    }
}
