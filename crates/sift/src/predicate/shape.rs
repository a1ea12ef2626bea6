//! Predicate shapes and the caller-supplied parameters for each.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::Cell;

/// The form a column predicate takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredicateShape {
    /// Inclusive `[min, max]` bounds.
    Range,
    /// Value is one of a subset of levels.
    Membership,
    /// Case-insensitive substring match.
    Substring,
    /// Boolean equality.
    Equality,
    /// Cell is null.
    IsNull,
}

impl PredicateShape {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            PredicateShape::Range => "range",
            PredicateShape::Membership => "membership",
            PredicateShape::Substring => "substring",
            PredicateShape::Equality => "equality",
            PredicateShape::IsNull => "is_null",
        }
    }
}

impl fmt::Display for PredicateShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parameters supplied for a predicate, one variant per shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum PredicateParams {
    /// Bounds are parsed against the column kind; text is accepted.
    Range { min: Cell, max: Cell },
    Membership { levels: Vec<String> },
    Substring { needle: String },
    Equality { value: bool },
    IsNull,
}

impl PredicateParams {
    /// The shape these parameters belong to.
    pub fn shape(&self) -> PredicateShape {
        match self {
            PredicateParams::Range { .. } => PredicateShape::Range,
            PredicateParams::Membership { .. } => PredicateShape::Membership,
            PredicateParams::Substring { .. } => PredicateShape::Substring,
            PredicateParams::Equality { .. } => PredicateShape::Equality,
            PredicateParams::IsNull => PredicateShape::IsNull,
        }
    }

    /// Range over two bounds.
    pub fn range(min: impl Into<Cell>, max: impl Into<Cell>) -> Self {
        PredicateParams::Range {
            min: min.into(),
            max: max.into(),
        }
    }

    /// Membership over the given levels.
    pub fn membership<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        PredicateParams::Membership {
            levels: levels.into_iter().map(Into::into).collect(),
        }
    }

    /// Substring search.
    pub fn substring(needle: impl Into<String>) -> Self {
        PredicateParams::Substring {
            needle: needle.into(),
        }
    }
}
