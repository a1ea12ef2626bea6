//! Edit capture: view-relative operations collected into a ledger.

mod ledger;
mod operations;

pub use ledger::{EditLedger, Ledger};
pub use operations::EditOperation;
