//! Column type profiling.
//!
//! A [`TypeProfile`] classifies a column into a semantic [`ColumnKind`] and
//! records its bounded [`Domain`]: categorical levels or an observed
//! numeric/temporal range. Profiles are computed once per schema and are the
//! reference against which predicates and edits are validated.

mod parse;
mod profiler;
mod types;

pub use parse::{is_null_value, parse_bool, parse_number, parse_temporal};
pub use profiler::{ColumnDeclaration, ProfileConfig, TypeProfiler};
pub use types::{ColumnKind, Domain, TypeProfile, ValueRejection};
