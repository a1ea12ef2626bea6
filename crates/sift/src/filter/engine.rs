//! Filter engine: applies a predicate conjunction to a dataset.

use crate::dataset::Dataset;
use crate::error::{Result, SiftError};
use crate::predicate::Predicate;

use super::view::View;

/// Derives [`View`]s from a dataset.
///
/// A row is included iff it satisfies every predicate. Predicates are
/// evaluated in the order given and evaluation stops at the first failing
/// predicate for a row; the result does not depend on that order. The view
/// keeps the dataset's row order.
pub struct FilterEngine;

impl FilterEngine {
    /// Create a new filter engine.
    pub fn new() -> Self {
        Self
    }

    /// Apply `predicates` to `dataset` in a single pass.
    pub fn apply(&self, dataset: &Dataset, predicates: &[Predicate]) -> Result<View> {
        let schema = dataset.schema();

        // Resolve columns and check profiles up front so that a bad
        // predicate fails before any row is read.
        let mut resolved = Vec::with_capacity(predicates.len());
        for predicate in predicates {
            let column = predicate.column();
            let col_idx = schema
                .index_of(column)
                .ok_or_else(|| SiftError::UnknownColumn(column.to_string()))?;
            let current = schema
                .profile(column)
                .ok_or_else(|| SiftError::UnknownColumn(column.to_string()))?;
            if current != predicate.profile() {
                return Err(SiftError::invalid_predicate(
                    column,
                    "column profile changed since the predicate was built",
                    Vec::new(),
                ));
            }
            resolved.push((col_idx, predicate));
        }

        let row_ids = dataset
            .iter()
            .filter(|(_, row)| {
                resolved.iter().all(|(col_idx, predicate)| {
                    row.get(*col_idx).is_some_and(|cell| predicate.matches(cell))
                })
            })
            .map(|(id, _)| id)
            .collect::<Vec<_>>();

        tracing::debug!(
            rows = dataset.len(),
            matched = row_ids.len(),
            predicates = predicates.len(),
            version = dataset.version(),
            "derived view"
        );

        Ok(View::new(row_ids, dataset.version(), predicates.to_vec()))
    }

    /// A view over every row, for editing without filters.
    pub fn unfiltered(&self, dataset: &Dataset) -> View {
        View::new(dataset.row_ids().collect(), dataset.version(), Vec::new())
    }
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, RowId, Schema};
    use crate::input::DataTable;
    use crate::predicate::{PredicateBuilder, PredicateParams, PredicateShape};
    use crate::profile::{ColumnKind, TypeProfile, TypeProfiler};

    fn people() -> Dataset {
        let schema = Schema::new()
            .with_column("age", TypeProfile::numeric(17.0, 60.0).with_nullable(true))
            .with_column("risk", TypeProfile::categorical(["low", "med", "high"]));
        Dataset::from_rows(
            schema,
            vec![
                vec![Cell::Number(25.0), Cell::text("low")],
                vec![Cell::Number(40.0), Cell::text("high")],
                vec![Cell::Number(17.0), Cell::text("med")],
                vec![Cell::Number(60.0), Cell::text("high")],
                vec![Cell::Null, Cell::text("high")],
            ],
        )
        .unwrap()
    }

    fn predicate(dataset: &Dataset, column: &str, params: PredicateParams) -> Predicate {
        let profile = dataset.schema().profile(column).unwrap();
        PredicateBuilder::new()
            .build(column, profile, params.shape(), params)
            .unwrap()
    }

    fn ids(view: &View) -> Vec<u64> {
        view.iter().map(|id| id.get()).collect()
    }

    #[test]
    fn test_empty_conjunction_keeps_all_rows() {
        let dataset = people();
        let view = FilterEngine::new().apply(&dataset, &[]).unwrap();

        assert_eq!(ids(&view), vec![1, 2, 3, 4, 5]);
        assert_eq!(view, FilterEngine::new().unfiltered(&dataset));
    }

    #[test]
    fn test_conjunction_is_logical_and() {
        let dataset = people();
        let predicates = vec![
            predicate(&dataset, "age", PredicateParams::range(18.0, 59.0)),
            predicate(&dataset, "risk", PredicateParams::membership(["high"])),
        ];
        let view = FilterEngine::new().apply(&dataset, &predicates).unwrap();

        assert_eq!(ids(&view), vec![2]);
    }

    #[test]
    fn test_order_of_predicates_does_not_change_result() {
        let dataset = people();
        let age = predicate(&dataset, "age", PredicateParams::range(17.0, 40.0));
        let risk = predicate(&dataset, "risk", PredicateParams::membership(["low", "med"]));
        let engine = FilterEngine::new();

        let forward = engine.apply(&dataset, &[age.clone(), risk.clone()]).unwrap();
        let backward = engine.apply(&dataset, &[risk, age]).unwrap();

        assert_eq!(forward.row_ids(), backward.row_ids());
        assert_eq!(ids(&forward), vec![1, 3]);
    }

    #[test]
    fn test_null_excluded_except_is_null() {
        let dataset = people();
        let engine = FilterEngine::new();

        let wide = predicate(&dataset, "age", PredicateParams::range(17.0, 60.0));
        assert_eq!(ids(&engine.apply(&dataset, &[wide]).unwrap()), vec![1, 2, 3, 4]);

        let nulls = predicate(&dataset, "age", PredicateParams::IsNull);
        assert_eq!(ids(&engine.apply(&dataset, &[nulls]).unwrap()), vec![5]);
    }

    #[test]
    fn test_unknown_column_fails() {
        let dataset = people();
        let other = Dataset::from_rows(
            Schema::new().with_column("height", TypeProfile::numeric(0.0, 2.0)),
            Vec::new(),
        )
        .unwrap();
        let foreign = predicate(&other, "height", PredicateParams::range(0.0, 1.0));

        let err = FilterEngine::new().apply(&dataset, &[foreign]).unwrap_err();
        assert!(matches!(err, SiftError::UnknownColumn(name) if name == "height"));
    }

    #[test]
    fn test_stale_profile_is_rejected() {
        let dataset = people();
        let narrower = Dataset::from_rows(
            Schema::new().with_column("risk", TypeProfile::categorical(["low", "high"])),
            Vec::new(),
        )
        .unwrap();
        let old = predicate(&narrower, "risk", PredicateParams::membership(["low"]));

        let err = FilterEngine::new().apply(&dataset, &[old]).unwrap_err();
        assert!(matches!(err, SiftError::InvalidPredicate { .. }));
    }

    fn visits() -> Dataset {
        let table = DataTable::from_records(
            ["visited"],
            [
                ["2023-01-04 08:00"],
                ["2023-01-05 12:30"],
                ["NA"],
                ["2023-02-01 17:30"],
                ["2023-01-05"],
            ],
        );
        Dataset::from_table(&table, &TypeProfiler::new()).unwrap()
    }

    #[test]
    fn test_temporal_range_with_date_bounds() {
        let dataset = visits();
        assert_eq!(
            dataset.schema().profile("visited").unwrap().kind,
            ColumnKind::Temporal
        );

        let window = predicate(
            &dataset,
            "visited",
            PredicateParams::range("2023-01-05", "2023-02-01"),
        );
        let view = FilterEngine::new().apply(&dataset, &[window]).unwrap();

        // The upper bound is midnight, so the afternoon of 2023-02-01 falls outside.
        assert_eq!(ids(&view), vec![2, 5]);
    }

    #[test]
    fn test_temporal_range_outside_observed_bounds() {
        let dataset = visits();
        let profile = dataset.schema().profile("visited").unwrap();
        let params = PredicateParams::range("2022-12-01", "2023-01-04 23:59");

        let err = PredicateBuilder::new()
            .build("visited", profile, PredicateShape::Range, params.clone())
            .unwrap_err();
        match err {
            SiftError::InvalidPredicate { rejected, .. } => assert_eq!(rejected, vec!["2022-12-01"]),
            other => panic!("unexpected error: {other}"),
        }

        let widened = PredicateBuilder::new()
            .allow_out_of_range(true)
            .build("visited", profile, PredicateShape::Range, params)
            .unwrap();
        let view = FilterEngine::new().apply(&dataset, &[widened]).unwrap();
        assert_eq!(ids(&view), vec![1]);
    }

    #[test]
    fn test_view_reads_through_to_dataset() {
        let dataset = people();
        let high = predicate(&dataset, "risk", PredicateParams::membership(["high"]));
        let view = FilterEngine::new().apply(&dataset, &[high]).unwrap();

        assert_eq!(view.get(0), Some(RowId::new(2)));
        assert_eq!(view.cell(&dataset, 1, "age"), Some(&Cell::Number(60.0)));
        assert_eq!(view.rows(&dataset).count(), 3);
        assert_eq!(view.base_version(), 0);
    }
}
