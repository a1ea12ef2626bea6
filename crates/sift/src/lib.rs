//! Sift: filter tabular data into views and reconcile edits made against them.
//!
//! A base [`Dataset`] is profiled once per schema. Callers build validated
//! [`Predicate`]s from each column's [`TypeProfile`], derive a [`View`] (an
//! ordered list of stable [`RowId`]s, never copies), capture edits against
//! view positions in an [`EditLedger`], and reconcile the finalized
//! [`Ledger`] back into the base dataset.
//!
//! # Core Principles
//!
//! - **Stable identity**: rows keep their `RowId` across every filter/edit cycle
//! - **Fail fast**: out-of-domain predicates are rejected before any view exists
//! - **Exactly once**: a ledger is consumed by reconciliation and checked
//!   against the dataset version, so stale edits never land on moved rows
//! - **Isolated conflicts**: one bad edit is reported, the rest still apply
//!
//! # Example
//!
//! ```no_run
//! use sift::{EditOperation, PredicateParams, PredicateShape, Sift};
//!
//! let sift = Sift::new();
//! let (dataset, _source) = sift.load("patients.csv").unwrap();
//!
//! let adults = sift
//!     .build_predicate(&dataset, "age", PredicateShape::Range, PredicateParams::range(18.0, 59.0))
//!     .unwrap();
//! let view = sift.filter(&dataset, &[adults]).unwrap();
//!
//! let mut ledger = sift.ledger(&view);
//! ledger.capture(EditOperation::update(0, "age", 26.0)).unwrap();
//! let (dataset, report) = sift.reconcile(&dataset, ledger.finalize()).unwrap();
//!
//! println!("version {}: {:?}", dataset.version(), report.status());
//! ```

pub mod dataset;
pub mod edit;
pub mod error;
pub mod export;
pub mod filter;
pub mod input;
pub mod predicate;
pub mod profile;
pub mod reconcile;

mod sift;

pub use crate::sift::{Sift, SiftConfig};
pub use dataset::{Cell, Dataset, Row, RowId, Schema, SharedDataset};
pub use edit::{EditLedger, EditOperation, Ledger};
pub use error::{Result, SiftError};
pub use filter::{FilterEngine, View};
pub use input::{DataTable, Parser, ParserConfig, SourceMetadata};
pub use predicate::{Predicate, PredicateBuilder, PredicateParams, PredicateShape};
pub use profile::{ColumnDeclaration, ColumnKind, Domain, ProfileConfig, TypeProfile, TypeProfiler};
pub use reconcile::{
    CellChange, Conflict, ConflictReason, ConflictReport, ReconcileStatus, ReconciliationEngine,
    Resolution,
};
