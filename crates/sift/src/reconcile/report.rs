//! Reconciliation results and conflict reporting.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::{Cell, RowId};
use crate::edit::EditOperation;
use crate::profile::{ColumnKind, ValueRejection};

/// Why a single operation could not be applied as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConflictReason {
    /// The value cannot be read as the column's kind.
    TypeMismatch { expected: ColumnKind, value: String },
    /// The value is not one of the column's categorical levels.
    NotInDomain { value: String },
    /// The operation names a column outside the schema.
    UnknownColumn { column: String },
    /// The row was already deleted earlier in the same ledger.
    RowAlreadyDeleted { row: RowId },
    /// The row is no longer part of the dataset.
    RowMissing { row: RowId },
    /// The position lies outside the captured view.
    PositionOutOfRange { position: usize, len: usize },
    /// The insert anchor was deleted earlier in the same ledger.
    AnchorDeleted { anchor: RowId },
}

impl From<ValueRejection> for ConflictReason {
    fn from(rejection: ValueRejection) -> Self {
        match rejection {
            ValueRejection::TypeMismatch { expected, value } => {
                ConflictReason::TypeMismatch { expected, value }
            }
            ValueRejection::NotInDomain { value } => ConflictReason::NotInDomain { value },
        }
    }
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictReason::TypeMismatch { expected, value } => {
                write!(f, "'{}' is not a valid {} value", value, expected)
            }
            ConflictReason::NotInDomain { value } => {
                write!(f, "'{}' is not one of the column's levels", value)
            }
            ConflictReason::UnknownColumn { column } => write!(f, "unknown column '{}'", column),
            ConflictReason::RowAlreadyDeleted { row } => {
                write!(f, "row {} was already deleted in this batch", row)
            }
            ConflictReason::RowMissing { row } => write!(f, "row {} no longer exists", row),
            ConflictReason::PositionOutOfRange { position, len } => {
                write!(f, "view position {} out of range for {} rows", position, len)
            }
            ConflictReason::AnchorDeleted { anchor } => {
                write!(f, "anchor row {} was deleted in this batch", anchor)
            }
        }
    }
}

/// What happened to a conflicting operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// The operation was not applied.
    Skipped,
    /// The row was inserted at the end of the dataset instead.
    AppendedAtEnd,
}

/// A single operation that could not be applied as written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Conflict {
    /// Index of the operation in the finalized ledger.
    pub index: usize,
    /// The operation itself.
    pub operation: EditOperation,
    /// Why it conflicted.
    pub reason: ConflictReason,
    /// What was done about it.
    pub resolution: Resolution,
}

impl fmt::Display for Conflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let resolution = match self.resolution {
            Resolution::Skipped => "skipped",
            Resolution::AppendedAtEnd => "appended at end",
        };
        write!(
            f,
            "#{} {}: {} ({})",
            self.index,
            self.operation.description(),
            self.reason,
            resolution
        )
    }
}

/// Audit record for one changed cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellChange {
    pub row: RowId,
    pub column: String,
    pub old: Cell,
    pub new: Cell,
}

/// Overall outcome of a reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReconcileStatus {
    /// Every operation was applied as written.
    FullyApplied,
    /// The batch went through with this many conflicts.
    AppliedWithConflicts(usize),
}

/// Everything a reconciliation did and did not do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// Operations that could not be applied as written, by ledger index.
    pub conflicts: Vec<Conflict>,
    /// Number of operations that changed the dataset.
    pub applied: usize,
    /// Cell-level audit trail of updates.
    pub changes: Vec<CellChange>,
    /// Identities assigned to inserted rows, in ledger order.
    pub inserted: Vec<RowId>,
    /// Identities of deleted rows, in ledger order.
    pub deleted: Vec<RowId>,
    /// Dataset version after reconciliation.
    pub version: u64,
}

impl ConflictReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a conflict.
    pub(crate) fn add_conflict(
        &mut self,
        index: usize,
        operation: &EditOperation,
        reason: ConflictReason,
        resolution: Resolution,
    ) {
        self.conflicts.push(Conflict {
            index,
            operation: operation.clone(),
            reason,
            resolution,
        });
    }

    /// Distinguish a clean batch from one with conflicts.
    pub fn status(&self) -> ReconcileStatus {
        if self.conflicts.is_empty() {
            ReconcileStatus::FullyApplied
        } else {
            ReconcileStatus::AppliedWithConflicts(self.conflicts.len())
        }
    }

    /// Whether every operation applied as written.
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    /// Conflicts whose operation was dropped.
    pub fn skipped(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts
            .iter()
            .filter(|c| c.resolution == Resolution::Skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_counts_conflicts() {
        let mut report = ConflictReport::new();
        assert_eq!(report.status(), ReconcileStatus::FullyApplied);
        assert!(report.is_clean());

        let op = EditOperation::delete(0);
        report.add_conflict(
            0,
            &op,
            ConflictReason::RowAlreadyDeleted { row: RowId::new(1) },
            Resolution::Skipped,
        );
        report.add_conflict(
            1,
            &EditOperation::insert(1, [("x", 1.0)]),
            ConflictReason::AnchorDeleted { anchor: RowId::new(1) },
            Resolution::AppendedAtEnd,
        );

        assert_eq!(report.status(), ReconcileStatus::AppliedWithConflicts(2));
        assert_eq!(report.skipped().count(), 1);
    }

    #[test]
    fn test_reason_from_rejection() {
        let reason: ConflictReason = ValueRejection::NotInDomain {
            value: "extreme".to_string(),
        }
        .into();
        assert_eq!(
            reason,
            ConflictReason::NotInDomain {
                value: "extreme".to_string()
            }
        );
        assert!(reason.to_string().contains("extreme"));
    }

    #[test]
    fn test_conflict_display() {
        let conflict = Conflict {
            index: 3,
            operation: EditOperation::delete(1),
            reason: ConflictReason::RowMissing { row: RowId::new(9) },
            resolution: Resolution::Skipped,
        };
        assert_eq!(
            conflict.to_string(),
            "#3 Delete view row 1: row r9 no longer exists (skipped)"
        );
    }
}
