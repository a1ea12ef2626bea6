//! Append-only capture of edits against one view snapshot.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::dataset::RowId;
use crate::error::{Result, SiftError};
use crate::filter::View;
use crate::predicate::Predicate;

use super::operations::EditOperation;

/// Collects edits made against a single [`View`].
///
/// Operations are validated on capture and never changed or removed
/// afterwards. [`finalize`](Self::finalize) turns the log into a [`Ledger`].
#[derive(Debug, Clone)]
pub struct EditLedger {
    snapshot: Vec<RowId>,
    base_version: u64,
    predicates: Vec<Predicate>,
    operations: Vec<EditOperation>,
}

impl EditLedger {
    /// Start an empty ledger for `view`, snapshotting its row identities.
    pub fn new(view: &View) -> Self {
        Self {
            snapshot: view.row_ids().to_vec(),
            base_version: view.base_version(),
            predicates: view.predicates().to_vec(),
            operations: Vec::new(),
        }
    }

    /// Append an operation.
    ///
    /// Update and delete positions must lie in `[0, len)`; an insert may
    /// use `after == len` to append after the last view row.
    pub fn capture(&mut self, operation: EditOperation) -> Result<()> {
        let len = self.snapshot.len();
        let (position, limit) = match &operation {
            EditOperation::UpdateCell { position, .. } => (*position, len),
            EditOperation::DeleteRow { position } => (*position, len),
            EditOperation::InsertRow { after, .. } => (*after, len + 1),
        };
        if position >= limit {
            return Err(SiftError::PositionOutOfRange { position, len });
        }

        tracing::debug!(operation = %operation.description(), "captured edit");
        self.operations.push(operation);
        Ok(())
    }

    /// Number of captured operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether nothing has been captured.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Captured operations in capture order.
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Close the ledger.
    ///
    /// Cell updates to the same (position, column) are coalesced: the update
    /// keeps the slot of its first capture and the value of its last. Inserts
    /// and deletes are kept as captured.
    pub fn finalize(self) -> Ledger {
        let mut slots: IndexMap<(usize, String), usize> = IndexMap::new();
        let mut operations: Vec<EditOperation> = Vec::with_capacity(self.operations.len());

        for operation in self.operations {
            if let EditOperation::UpdateCell {
                position, column, ..
            } = &operation
            {
                let key = (*position, column.clone());
                if let Some(&slot) = slots.get(&key) {
                    operations[slot] = operation;
                    continue;
                }
                slots.insert(key, operations.len());
            }
            operations.push(operation);
        }

        Ledger {
            base_version: self.base_version,
            snapshot: self.snapshot,
            predicates: self.predicates,
            operations,
        }
    }
}

/// A finalized, coalesced set of edits ready for reconciliation.
///
/// Consumed by value by the reconciliation engine, so it applies at most once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    base_version: u64,
    snapshot: Vec<RowId>,
    predicates: Vec<Predicate>,
    operations: Vec<EditOperation>,
}

impl Ledger {
    /// Dataset version the view was derived from.
    pub fn base_version(&self) -> u64 {
        self.base_version
    }

    /// Row identities of the view at capture time, in view order.
    pub fn snapshot(&self) -> &[RowId] {
        &self.snapshot
    }

    /// Predicates that generated the view.
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Operations after coalescing.
    pub fn operations(&self) -> &[EditOperation] {
        &self.operations
    }

    /// Whether the ledger has no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
