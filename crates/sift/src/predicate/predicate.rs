//! Validated column predicates.

use chrono::NaiveDateTime;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::dataset::Cell;
use crate::profile::TypeProfile;

use super::shape::PredicateShape;

/// Normalized condition evaluated against a single cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    NumberRange { min: f64, max: f64 },
    TemporalRange {
        min: NaiveDateTime,
        max: NaiveDateTime,
    },
    Levels { levels: IndexSet<String> },
    /// Needle is stored lowercased.
    Contains { needle: String },
    Equals { value: bool },
    IsNull,
}

/// A per-column filter condition, validated against the column's profile.
///
/// Built only through [`PredicateBuilder`](super::PredicateBuilder). The
/// profile it was validated against is kept so that a later schema change
/// can be detected before the predicate is applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Predicate {
    column: String,
    shape: PredicateShape,
    condition: Condition,
    profile: TypeProfile,
    out_of_domain: bool,
}

impl Predicate {
    pub(crate) fn new(
        column: String,
        shape: PredicateShape,
        condition: Condition,
        profile: TypeProfile,
        out_of_domain: bool,
    ) -> Self {
        Self {
            column,
            shape,
            condition,
            profile,
            out_of_domain,
        }
    }

    /// Column this predicate applies to.
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Predicate shape.
    pub fn shape(&self) -> PredicateShape {
        self.shape
    }

    /// Normalized condition.
    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Profile the predicate was validated against.
    pub fn profile(&self) -> &TypeProfile {
        &self.profile
    }

    /// True when the caller overrode the observed range check.
    pub fn is_out_of_domain(&self) -> bool {
        self.out_of_domain
    }

    /// Evaluate against one cell. Null never matches except for `IsNull`.
    pub fn matches(&self, cell: &Cell) -> bool {
        match &self.condition {
            Condition::IsNull => cell.is_null(),
            Condition::NumberRange { min, max } => cell
                .as_number()
                .is_some_and(|n| *min <= n && n <= *max),
            Condition::TemporalRange { min, max } => cell
                .as_temporal()
                .is_some_and(|t| *min <= t && t <= *max),
            Condition::Levels { levels } => cell.as_text().is_some_and(|s| levels.contains(s)),
            Condition::Contains { needle } => cell
                .as_text()
                .is_some_and(|s| s.to_lowercase().contains(needle.as_str())),
            Condition::Equals { value } => cell.as_bool() == Some(*value),
        }
    }
}
