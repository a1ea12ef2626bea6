//! Column predicates: legal shapes per profile, validated construction, and
//! per-cell evaluation.

mod builder;
mod predicate;
mod shape;

pub use builder::PredicateBuilder;
pub use predicate::{Condition, Predicate};
pub use shape::{PredicateParams, PredicateShape};
