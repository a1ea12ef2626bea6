//! Filtered views: ordered row identities over a dataset snapshot.

use serde::{Deserialize, Serialize};

use crate::dataset::{Cell, Dataset, Row, RowId};
use crate::predicate::Predicate;

/// Read-only projection of a dataset: the identities of the rows that
/// satisfied a predicate conjunction, in base order.
///
/// A view never copies cell data and does not refresh when its dataset
/// changes; derive a new one after each reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    row_ids: Vec<RowId>,
    base_version: u64,
    predicates: Vec<Predicate>,
}

impl View {
    pub(crate) fn new(row_ids: Vec<RowId>, base_version: u64, predicates: Vec<Predicate>) -> Self {
        Self {
            row_ids,
            base_version,
            predicates,
        }
    }

    /// Number of rows in the view.
    pub fn len(&self) -> usize {
        self.row_ids.len()
    }

    /// Whether the view is empty.
    pub fn is_empty(&self) -> bool {
        self.row_ids.is_empty()
    }

    /// Row identity at a view position.
    pub fn get(&self, position: usize) -> Option<RowId> {
        self.row_ids.get(position).copied()
    }

    /// Row identities in view order.
    pub fn row_ids(&self) -> &[RowId] {
        &self.row_ids
    }

    /// Iterate over row identities in view order.
    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.row_ids.iter().copied()
    }

    /// Version of the dataset this view was derived from.
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    /// Predicates that produced this view.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Read the view's rows through to the dataset.
    ///
    /// Rows missing from `dataset` (because it has moved on) are skipped.
    pub fn rows<'a>(&'a self, dataset: &'a Dataset) -> impl Iterator<Item = (RowId, &'a Row)> + 'a {
        self.row_ids
            .iter()
            .filter_map(move |id| dataset.row(*id).map(|row| (*id, row)))
    }

    /// Read one cell by view position and column name.
    pub fn cell<'a>(&self, dataset: &'a Dataset, position: usize, column: &str) -> Option<&'a Cell> {
        dataset.get(self.get(position)?, column)
    }
}
