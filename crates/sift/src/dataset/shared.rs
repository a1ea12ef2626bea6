//! A dataset handle shared between readers and a single writer.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use crate::edit::Ledger;
use crate::error::Result;
use crate::filter::{FilterEngine, View};
use crate::predicate::Predicate;
use crate::reconcile::{ConflictReport, ReconciliationEngine};

use super::store::Dataset;

/// Copy-on-write dataset handle.
///
/// Readers take an `Arc` snapshot and never see a half-applied ledger.
/// Reconciliations are serialized on a writer lock, run against a private
/// copy, and publish the result with a single pointer swap.
#[derive(Debug)]
pub struct SharedDataset {
    current: RwLock<Arc<Dataset>>,
    writer: Mutex<()>,
}

impl SharedDataset {
    /// Wrap a dataset for shared use.
    pub fn new(dataset: Dataset) -> Self {
        Self {
            current: RwLock::new(Arc::new(dataset)),
            writer: Mutex::new(()),
        }
    }

    /// The latest published dataset.
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.current.read())
    }

    /// Version of the latest published dataset.
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }

    /// Derive a view from the latest snapshot.
    pub fn filter(&self, engine: &FilterEngine, predicates: &[Predicate]) -> Result<View> {
        let dataset = self.snapshot();
        engine.apply(&dataset, predicates)
    }

    /// Reconcile a ledger and publish the result.
    ///
    /// A ledger captured before another writer published fails with
    /// [`SiftError::StaleLedger`](crate::SiftError::StaleLedger).
    pub fn reconcile(&self, engine: &ReconciliationEngine, ledger: Ledger) -> Result<ConflictReport> {
        let _guard = self.writer.lock();

        let base = self.snapshot();
        let (updated, report) = engine.reconcile(&base, ledger)?;
        *self.current.write() = Arc::new(updated);

        Ok(report)
    }

    /// Unwrap the latest dataset, cloning only if snapshots are still held.
    pub fn into_inner(self) -> Dataset {
        Arc::unwrap_or_clone(self.current.into_inner())
    }
}
