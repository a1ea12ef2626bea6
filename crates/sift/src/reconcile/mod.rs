//! Reconciliation of edit ledgers into the base dataset.

mod engine;
mod report;

pub use engine::ReconciliationEngine;
pub use report::{CellChange, Conflict, ConflictReason, ConflictReport, ReconcileStatus, Resolution};
