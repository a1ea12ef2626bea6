//! In-memory dataset model: typed cells, schema, and row identity.

mod cell;
mod schema;
mod shared;
mod store;

pub use cell::Cell;
pub use schema::Schema;
pub use shared::SharedDataset;
pub use store::{Dataset, Row, RowId};
