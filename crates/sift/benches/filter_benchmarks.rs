//! Filter and reconciliation performance benchmarks.
//!
//! Measures view derivation over conjunctions and reconciliation of edit
//! batches against in-memory datasets of increasing size.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sift::{
    DataTable, Dataset, EditLedger, EditOperation, FilterEngine, Predicate, PredicateParams,
    PredicateShape, ReconciliationEngine, Sift,
};

/// Generate a patient-style table with numeric, categorical, date and text columns.
fn generate_table(rows: usize) -> DataTable {
    let sites = ["north", "south", "east", "west"];
    let risks = ["low", "med", "high"];

    let records = (0..rows).map(|row| {
        vec![
            format!("P{:06}", row),
            if row % 37 == 0 {
                "NA".to_string()
            } else {
                (18 + row % 70).to_string()
            },
            sites[row % sites.len()].to_string(),
            risks[row % risks.len()].to_string(),
            format!("2023-{:02}-{:02}", (row % 12) + 1, (row % 28) + 1),
            format!("visit note {}", row % 97),
        ]
    });

    DataTable::from_records(["id", "age", "site", "risk", "visited", "notes"], records)
}

fn predicates(sift: &Sift, dataset: &Dataset) -> Vec<Predicate> {
    vec![
        sift.build_predicate(
            dataset,
            "age",
            PredicateShape::Range,
            PredicateParams::range(30.0, 60.0),
        )
        .unwrap(),
        sift.build_predicate(
            dataset,
            "risk",
            PredicateShape::Membership,
            PredicateParams::membership(["high", "med"]),
        )
        .unwrap(),
        sift.build_predicate(
            dataset,
            "notes",
            PredicateShape::Substring,
            PredicateParams::substring("NOTE 1"),
        )
        .unwrap(),
    ]
}

/// Benchmark view derivation.
fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");
    let sift = Sift::new();

    for rows in [1_000, 10_000, 100_000].iter() {
        let dataset = sift.profile_table(&generate_table(*rows)).unwrap();
        let predicates = predicates(&sift, &dataset);
        let engine = FilterEngine::new();

        group.throughput(Throughput::Elements(*rows as u64));
        group.bench_with_input(BenchmarkId::new("conjunction_rows", rows), &dataset, |b, dataset| {
            b.iter(|| black_box(engine.apply(dataset, &predicates).unwrap()))
        });
    }

    group.finish();
}

/// Benchmark reconciliation of a mixed edit batch.
fn bench_reconcile(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconcile");
    let sift = Sift::new();

    for rows in [1_000, 10_000, 100_000].iter() {
        let dataset = sift.profile_table(&generate_table(*rows)).unwrap();
        let view = sift.filter(&dataset, &predicates(&sift, &dataset)).unwrap();

        group.bench_with_input(BenchmarkId::new("mixed_batch_rows", rows), &view, |b, view| {
            b.iter_with_setup(
                || {
                    let mut ledger = EditLedger::new(view);
                    for position in (0..view.len()).step_by(3) {
                        ledger
                            .capture(EditOperation::update(position, "risk", "low"))
                            .unwrap();
                    }
                    for position in (1..view.len()).step_by(7) {
                        ledger.capture(EditOperation::delete(position)).unwrap();
                    }
                    for after in (0..=view.len()).step_by(11) {
                        ledger
                            .capture(EditOperation::insert(after, [("age", 40.0)]))
                            .unwrap();
                    }
                    ledger.finalize()
                },
                |ledger| black_box(ReconciliationEngine::new().reconcile(&dataset, ledger).unwrap()),
            )
        });
    }

    group.finish();
}

criterion_group!(benches, bench_filter, bench_reconcile);
criterion_main!(benches);
