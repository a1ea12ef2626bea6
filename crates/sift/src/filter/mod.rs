//! Filtering: predicate conjunctions over a dataset, producing views.

mod engine;
mod view;

pub use engine::FilterEngine;
pub use view::View;
