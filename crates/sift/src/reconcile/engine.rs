//! Reconciliation engine that merges a ledger into the base dataset.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;

use crate::dataset::{Cell, Dataset, Row, RowId};
use crate::edit::{EditOperation, Ledger};
use crate::error::{Result, SiftError};

use super::report::{CellChange, ConflictReason, ConflictReport, Resolution};

/// Engine for applying finalized ledgers to a dataset.
///
/// View positions are translated through the ledger's captured snapshot,
/// never through a freshly derived view. Operations are applied in three
/// phases: cell updates, then deletes, then inserts. Each phase keeps
/// ledger order. A bad operation becomes a [`Conflict`](super::Conflict)
/// and the rest of the batch still applies.
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    /// Create a new reconciliation engine.
    pub fn new() -> Self {
        Self
    }

    /// Reconcile `ledger` against a copy of `dataset`.
    ///
    /// Fails with [`SiftError::StaleLedger`] if the ledger was captured
    /// against a different version; `dataset` is never modified.
    pub fn reconcile(&self, dataset: &Dataset, ledger: Ledger) -> Result<(Dataset, ConflictReport)> {
        Self::check_version(dataset, &ledger)?;
        let mut updated = dataset.clone();
        let report = self.reconcile_in_place(&mut updated, ledger)?;
        Ok((updated, report))
    }

    /// Reconcile `ledger` directly into `dataset`.
    ///
    /// The version check happens before anything is touched, so a stale
    /// ledger leaves `dataset` as it was.
    pub fn reconcile_in_place(&self, dataset: &mut Dataset, ledger: Ledger) -> Result<ConflictReport> {
        Self::check_version(dataset, &ledger)?;

        let mut report = ConflictReport::new();
        let snapshot = ledger.snapshot();
        let operations = ledger.operations();

        for (index, operation) in operations.iter().enumerate() {
            if let EditOperation::UpdateCell {
                position,
                column,
                value,
            } = operation
            {
                Self::apply_update(
                    dataset,
                    snapshot,
                    &mut report,
                    index,
                    operation,
                    *position,
                    column,
                    value,
                );
            }
        }

        let mut deleted: HashSet<RowId> = HashSet::new();
        for (index, operation) in operations.iter().enumerate() {
            if let EditOperation::DeleteRow { position } = operation {
                let Some(id) = Self::resolve(snapshot, &mut report, index, operation, *position) else {
                    continue;
                };
                if deleted.contains(&id) {
                    report.add_conflict(
                        index,
                        operation,
                        ConflictReason::RowAlreadyDeleted { row: id },
                        Resolution::Skipped,
                    );
                } else if dataset.remove_row(id).is_some() {
                    deleted.insert(id);
                    report.deleted.push(id);
                    report.applied += 1;
                } else {
                    report.add_conflict(
                        index,
                        operation,
                        ConflictReason::RowMissing { row: id },
                        Resolution::Skipped,
                    );
                }
            }
        }

        // Last row inserted for each `after` value, so repeated inserts on
        // one anchor land in ledger order.
        let mut last_inserted: HashMap<usize, RowId> = HashMap::new();
        for (index, operation) in operations.iter().enumerate() {
            if let EditOperation::InsertRow { after, values } = operation {
                if *after > snapshot.len() {
                    report.add_conflict(
                        index,
                        operation,
                        ConflictReason::PositionOutOfRange {
                            position: *after,
                            len: snapshot.len(),
                        },
                        Resolution::Skipped,
                    );
                    continue;
                }
                let Some(row) = Self::build_row(dataset, &mut report, index, operation, values) else {
                    continue;
                };

                let id = match Self::placement(dataset, snapshot, &last_inserted, *after) {
                    Placement::At(target) => dataset.insert_row_at(target, row),
                    Placement::End => dataset.push_row(row),
                    Placement::AnchorGone(anchor) => {
                        let reason = if deleted.contains(&anchor) {
                            ConflictReason::AnchorDeleted { anchor }
                        } else {
                            ConflictReason::RowMissing { row: anchor }
                        };
                        report.add_conflict(index, operation, reason, Resolution::AppendedAtEnd);
                        dataset.push_row(row)
                    }
                };
                last_inserted.insert(*after, id);
                report.inserted.push(id);
                report.applied += 1;
            }
        }

        dataset.bump_version();
        report.version = dataset.version();
        report.conflicts.sort_by_key(|c| c.index);

        for conflict in &report.conflicts {
            tracing::warn!(
                index = conflict.index,
                reason = %conflict.reason,
                "edit conflict"
            );
        }
        tracing::info!(
            operations = operations.len(),
            applied = report.applied,
            conflicts = report.conflicts.len(),
            version = report.version,
            "reconciled ledger"
        );

        Ok(report)
    }

    fn check_version(dataset: &Dataset, ledger: &Ledger) -> Result<()> {
        if ledger.base_version() != dataset.version() {
            tracing::warn!(
                ledger_version = ledger.base_version(),
                dataset_version = dataset.version(),
                "rejecting stale ledger"
            );
            return Err(SiftError::StaleLedger {
                ledger_version: ledger.base_version(),
                dataset_version: dataset.version(),
            });
        }
        Ok(())
    }

    /// Translate a view position to a row identity through the snapshot.
    fn resolve(
        snapshot: &[RowId],
        report: &mut ConflictReport,
        index: usize,
        operation: &EditOperation,
        position: usize,
    ) -> Option<RowId> {
        let id = snapshot.get(position).copied();
        if id.is_none() {
            report.add_conflict(
                index,
                operation,
                ConflictReason::PositionOutOfRange {
                    position,
                    len: snapshot.len(),
                },
                Resolution::Skipped,
            );
        }
        id
    }

    #[allow(clippy::too_many_arguments)]
    fn apply_update(
        dataset: &mut Dataset,
        snapshot: &[RowId],
        report: &mut ConflictReport,
        index: usize,
        operation: &EditOperation,
        position: usize,
        column: &str,
        value: &Cell,
    ) {
        let Some(id) = Self::resolve(snapshot, report, index, operation, position) else {
            return;
        };

        let schema = dataset.schema();
        let (Some(col_idx), Some(profile)) = (schema.index_of(column), schema.profile(column)) else {
            report.add_conflict(
                index,
                operation,
                ConflictReason::UnknownColumn {
                    column: column.to_string(),
                },
                Resolution::Skipped,
            );
            return;
        };

        let cell = match profile.coerce(value) {
            Ok(cell) => cell,
            Err(rejection) => {
                report.add_conflict(index, operation, rejection.into(), Resolution::Skipped);
                return;
            }
        };

        match dataset.set_cell(id, col_idx, cell.clone()) {
            Some(old) => {
                report.changes.push(CellChange {
                    row: id,
                    column: column.to_string(),
                    old,
                    new: cell,
                });
                report.applied += 1;
            }
            None => report.add_conflict(
                index,
                operation,
                ConflictReason::RowMissing { row: id },
                Resolution::Skipped,
            ),
        }
    }

    /// Type-check insert values and lay them out in schema order.
    fn build_row(
        dataset: &Dataset,
        report: &mut ConflictReport,
        index: usize,
        operation: &EditOperation,
        values: &IndexMap<String, Cell>,
    ) -> Option<Row> {
        let schema = dataset.schema();

        if let Some(unknown) = values.keys().find(|name| schema.index_of(name).is_none()) {
            report.add_conflict(
                index,
                operation,
                ConflictReason::UnknownColumn {
                    column: unknown.clone(),
                },
                Resolution::Skipped,
            );
            return None;
        }

        let mut cells = Vec::with_capacity(schema.len());
        for (name, profile) in schema.iter() {
            let value = values.get(name).unwrap_or(&Cell::Null);
            match profile.coerce(value) {
                Ok(cell) => cells.push(cell),
                Err(rejection) => {
                    report.add_conflict(index, operation, rejection.into(), Resolution::Skipped);
                    return None;
                }
            }
        }
        Some(Row::new(cells))
    }

    /// Work out where an insert with this `after` goes.
    fn placement(
        dataset: &Dataset,
        snapshot: &[RowId],
        last_inserted: &HashMap<usize, RowId>,
        after: usize,
    ) -> Placement {
        let (anchor, offset) = match (after, snapshot.first()) {
            (_, None) => return Placement::End,
            (0, Some(first)) => (*first, 0),
            (k, Some(_)) => (snapshot[k - 1], 1),
        };

        // Checked on every insert: a gone anchor conflicts each time.
        let Some(position) = dataset.position(anchor) else {
            return Placement::AnchorGone(anchor);
        };

        match last_inserted.get(&after).and_then(|id| dataset.position(*id)) {
            Some(previous) => Placement::At(previous + 1),
            None => Placement::At(position + offset),
        }
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

enum Placement {
    At(usize),
    End,
    AnchorGone(RowId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Schema;
    use crate::edit::EditLedger;
    use crate::filter::{FilterEngine, View};
    use crate::predicate::{PredicateBuilder, PredicateParams};
    use crate::profile::TypeProfile;
    use crate::reconcile::ReconcileStatus;

    fn ages() -> Dataset {
        let schema = Schema::new()
            .with_column("age", TypeProfile::numeric(17.0, 60.0))
            .with_column("risk", TypeProfile::categorical(["low", "med", "high"]).with_nullable(true));
        Dataset::from_rows(
            schema,
            vec![
                vec![Cell::Number(25.0), Cell::text("low")],
                vec![Cell::Number(40.0), Cell::text("high")],
                vec![Cell::Number(17.0), Cell::text("med")],
                vec![Cell::Number(60.0), Cell::text("high")],
            ],
        )
        .unwrap()
    }

    fn adults(dataset: &Dataset) -> View {
        let params = PredicateParams::range(18.0, 59.0);
        let predicate = PredicateBuilder::new()
            .build("age", dataset.schema().profile("age").unwrap(), params.shape(), params)
            .unwrap();
        FilterEngine::new().apply(dataset, &[predicate]).unwrap()
    }

    fn ledger(view: &View, operations: Vec<EditOperation>) -> Ledger {
        let mut ledger = EditLedger::new(view);
        for op in operations {
            ledger.capture(op).unwrap();
        }
        ledger.finalize()
    }

    fn ids(dataset: &Dataset) -> Vec<u64> {
        dataset.row_ids().map(|id| id.get()).collect()
    }

    fn ages_of(dataset: &Dataset) -> Vec<f64> {
        dataset
            .column_values("age")
            .unwrap()
            .filter_map(Cell::as_number)
            .collect()
    }

    #[test]
    fn test_update_then_delete_through_view() {
        let dataset = ages();
        let view = adults(&dataset);
        let ledger = ledger(
            &view,
            vec![EditOperation::update(0, "age", 26.0), EditOperation::delete(1)],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(ids(&updated), vec![1, 3, 4]);
        assert_eq!(ages_of(&updated), vec![26.0, 17.0, 60.0]);
        assert_eq!(updated.version(), dataset.version() + 1);
        assert_eq!(report.status(), ReconcileStatus::FullyApplied);
        assert_eq!(report.applied, 2);
        assert_eq!(report.changes[0].old, Cell::Number(25.0));
        assert_eq!(report.deleted, vec![RowId::new(2)]);
    }

    #[test]
    fn test_empty_ledger_only_bumps_version() {
        let dataset = ages();
        let view = FilterEngine::new().unfiltered(&dataset);

        let (updated, report) = ReconciliationEngine::new()
            .reconcile(&dataset, EditLedger::new(&view).finalize())
            .unwrap();

        assert_eq!(ids(&updated), ids(&dataset));
        assert_eq!(ages_of(&updated), ages_of(&dataset));
        assert_eq!(updated.version(), 1);
        assert_eq!(report.applied, 0);
    }

    #[test]
    fn test_stale_ledger_is_rejected_untouched() {
        let mut dataset = ages();
        let view = adults(&dataset);
        let engine = ReconciliationEngine::new();

        let first = ledger(&view, vec![EditOperation::update(0, "age", 30.0)]);
        let second = ledger(&view, vec![EditOperation::delete(0)]);
        engine.reconcile_in_place(&mut dataset, first).unwrap();
        let before = dataset.clone();

        let err = engine.reconcile_in_place(&mut dataset, second).unwrap_err();

        assert!(matches!(
            err,
            SiftError::StaleLedger {
                ledger_version: 0,
                dataset_version: 1
            }
        ));
        assert_eq!(dataset, before);
    }

    #[test]
    fn test_bad_values_are_isolated() {
        let dataset = ages();
        let view = FilterEngine::new().unfiltered(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::update(0, "age", "old"),
                EditOperation::update(1, "risk", "extreme"),
                EditOperation::update(2, "height", 1.8),
                EditOperation::update(3, "risk", "low"),
            ],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(report.status(), ReconcileStatus::AppliedWithConflicts(3));
        assert!(matches!(report.conflicts[0].reason, ConflictReason::TypeMismatch { .. }));
        assert!(matches!(report.conflicts[1].reason, ConflictReason::NotInDomain { .. }));
        assert!(matches!(report.conflicts[2].reason, ConflictReason::UnknownColumn { .. }));
        assert_eq!(updated.get(RowId::new(4), "risk"), Some(&Cell::text("low")));
        assert_eq!(updated.get(RowId::new(1), "age"), Some(&Cell::Number(25.0)));
    }

    #[test]
    fn test_out_of_range_number_is_accepted() {
        let dataset = ages();
        let view = FilterEngine::new().unfiltered(&dataset);
        let ledger = ledger(&view, vec![EditOperation::update(0, "age", 99.0)]);

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert!(report.is_clean());
        assert_eq!(updated.get(RowId::new(1), "age"), Some(&Cell::Number(99.0)));
    }

    #[test]
    fn test_duplicate_delete_is_one_conflict() {
        let dataset = ages();
        let view = FilterEngine::new().unfiltered(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::delete(1),
                EditOperation::update(0, "age", 20.0),
                EditOperation::delete(1),
                EditOperation::delete(3),
            ],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].index, 2);
        assert_eq!(
            report.conflicts[0].reason,
            ConflictReason::RowAlreadyDeleted { row: RowId::new(2) }
        );
        assert_eq!(report.applied, 3);
        assert_eq!(ids(&updated), vec![1, 3]);
    }

    #[test]
    fn test_insert_after_view_row() {
        let dataset = ages();
        let view = adults(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::insert(1, [("age", 30.0)]),
                EditOperation::insert(1, [("age", 31.0)]),
                EditOperation::insert(2, [("age", 45.0)]),
            ],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert!(report.is_clean());
        assert_eq!(ids(&updated), vec![1, 5, 6, 2, 7, 3, 4]);
        assert_eq!(updated.get(RowId::new(5), "risk"), Some(&Cell::Null));
    }

    #[test]
    fn test_insert_at_view_start() {
        let dataset = ages();
        let view = adults(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::insert(0, [("age", 20.0)]),
                EditOperation::insert(0, [("age", 21.0)]),
            ],
        );

        let (updated, _) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(ids(&updated), vec![5, 6, 1, 2, 3, 4]);
    }

    #[test]
    fn test_insert_into_empty_view_appends() {
        let dataset = ages();
        let params = PredicateParams::membership(Vec::<String>::new());
        let predicate = PredicateBuilder::new()
            .build("risk", dataset.schema().profile("risk").unwrap(), params.shape(), params)
            .unwrap();
        let view = FilterEngine::new().apply(&dataset, &[predicate]).unwrap();
        assert!(view.is_empty());

        let ledger = ledger(&view, vec![EditOperation::insert(0, [("age", 33.0)])]);
        let (updated, _) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(ids(&updated), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_insert_after_deleted_anchor_appends_with_conflict() {
        let dataset = ages();
        let view = adults(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::insert(1, [("age", 30.0)]),
                EditOperation::delete(0),
            ],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(ids(&updated), vec![2, 3, 4, 5]);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].index, 0);
        assert_eq!(report.conflicts[0].resolution, Resolution::AppendedAtEnd);
        assert_eq!(
            report.conflicts[0].reason,
            ConflictReason::AnchorDeleted { anchor: RowId::new(1) }
        );
        assert_eq!(report.inserted, vec![RowId::new(5)]);
    }

    #[test]
    fn test_every_insert_on_deleted_anchor_conflicts() {
        let dataset = ages();
        let view = FilterEngine::new().unfiltered(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::delete(0),
                EditOperation::insert(1, [("age", 50.0)]),
                EditOperation::insert(1, [("age", 51.0)]),
            ],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(ids(&updated), vec![2, 3, 4, 5, 6]);
        assert_eq!(report.status(), ReconcileStatus::AppliedWithConflicts(2));
        let indices: Vec<usize> = report.conflicts.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2]);
        for conflict in &report.conflicts {
            assert_eq!(
                conflict.reason,
                ConflictReason::AnchorDeleted { anchor: RowId::new(1) }
            );
            assert_eq!(conflict.resolution, Resolution::AppendedAtEnd);
        }
        assert_eq!(report.inserted, vec![RowId::new(5), RowId::new(6)]);
        assert_eq!(updated.get(RowId::new(5), "age"), Some(&Cell::Number(50.0)));
        assert_eq!(updated.get(RowId::new(6), "age"), Some(&Cell::Number(51.0)));
    }

    #[test]
    fn test_invalid_insert_is_skipped_whole() {
        let dataset = ages();
        let view = FilterEngine::new().unfiltered(&dataset);
        let ledger = ledger(
            &view,
            vec![
                EditOperation::insert(4, [("age", Cell::Number(50.0)), ("risk", Cell::text("extreme"))]),
                EditOperation::insert(4, [("weight", 3.0)]),
            ],
        );

        let (updated, report) = ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap();

        assert_eq!(updated.len(), 4);
        assert_eq!(report.skipped().count(), 2);
        assert!(report.inserted.is_empty());
        assert_eq!(updated.version(), 1);
    }
}
