//! Column kinds, domains, and the type profile built from them.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::dataset::Cell;

use super::parse::{is_null_value, parse_bool, parse_number, parse_temporal};

/// Semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Numbers; filtered by range.
    Numeric,
    /// true/false values; filtered by equality.
    Boolean,
    /// Enumerated levels; filtered by membership.
    Categorical,
    /// Dates and date-times; filtered by range.
    Temporal,
    /// Free text; filtered by substring.
    Text,
}

impl ColumnKind {
    /// Get a human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Temporal => "temporal",
            ColumnKind::Text => "text",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Allowed-value domain of a column, where it is bounded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Domain {
    /// Unbounded (text and boolean columns).
    None,
    /// Categorical levels in their defined order.
    Levels { levels: Vec<String>, ordered: bool },
    /// Observed numeric range.
    NumericRange { min: f64, max: f64 },
    /// Observed temporal range.
    TemporalRange {
        min: NaiveDateTime,
        max: NaiveDateTime,
    },
}

/// Why a value was refused by a column profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValueRejection {
    /// The value cannot be read as the column's kind.
    TypeMismatch { expected: ColumnKind, value: String },
    /// The value is a valid scalar but not one of the categorical levels.
    NotInDomain { value: String },
}

impl fmt::Display for ValueRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueRejection::TypeMismatch { expected, value } => {
                write!(f, "'{}' is not a valid {} value", value, expected)
            }
            ValueRejection::NotInDomain { value } => {
                write!(f, "'{}' is not one of the column's levels", value)
            }
        }
    }
}

/// Classification of a column plus its domain.
///
/// Once a dataset is built its profiles stay fixed; edits are checked
/// against them rather than widening them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeProfile {
    /// Semantic kind.
    pub kind: ColumnKind,
    /// Allowed-value domain.
    pub domain: Domain,
    /// Whether null values were observed.
    #[serde(default)]
    pub nullable: bool,
}

impl TypeProfile {
    /// Numeric column with the given observed range.
    pub fn numeric(min: f64, max: f64) -> Self {
        Self {
            kind: ColumnKind::Numeric,
            domain: Domain::NumericRange { min, max },
            nullable: false,
        }
    }

    /// Temporal column with the given observed range.
    pub fn temporal(min: NaiveDateTime, max: NaiveDateTime) -> Self {
        Self {
            kind: ColumnKind::Temporal,
            domain: Domain::TemporalRange { min, max },
            nullable: false,
        }
    }

    /// Categorical column with unordered levels.
    pub fn categorical<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ColumnKind::Categorical,
            domain: Domain::Levels {
                levels: levels.into_iter().map(Into::into).collect(),
                ordered: false,
            },
            nullable: false,
        }
    }

    /// Categorical column whose levels are ordered as given.
    pub fn ordered_categorical<I, S>(levels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind: ColumnKind::Categorical,
            domain: Domain::Levels {
                levels: levels.into_iter().map(Into::into).collect(),
                ordered: true,
            },
            nullable: false,
        }
    }

    /// Boolean column.
    pub fn boolean() -> Self {
        Self {
            kind: ColumnKind::Boolean,
            domain: Domain::None,
            nullable: false,
        }
    }

    /// Free text column.
    pub fn text() -> Self {
        Self {
            kind: ColumnKind::Text,
            domain: Domain::None,
            nullable: false,
        }
    }

    /// Mark the profile as nullable.
    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Categorical levels, if any.
    pub fn levels(&self) -> Option<&[String]> {
        match &self.domain {
            Domain::Levels { levels, .. } => Some(levels),
            _ => None,
        }
    }

    /// Whether categorical levels carry an order.
    pub fn is_ordered(&self) -> bool {
        matches!(self.domain, Domain::Levels { ordered: true, .. })
    }

    /// Convert a raw string into a cell of this column's kind.
    pub fn parse_raw(&self, raw: &str) -> Result<Cell, ValueRejection> {
        if is_null_value(raw) {
            return Ok(Cell::Null);
        }
        self.coerce(&Cell::text(raw.trim()))
    }

    /// Type-check a value against this profile, converting text where the
    /// column kind allows it. Null is always accepted.
    pub fn coerce(&self, cell: &Cell) -> Result<Cell, ValueRejection> {
        if cell.is_null() {
            return Ok(Cell::Null);
        }

        let mismatch = || ValueRejection::TypeMismatch {
            expected: self.kind,
            value: cell.to_string(),
        };

        match self.kind {
            ColumnKind::Numeric => match cell {
                Cell::Number(n) if n.is_finite() => Ok(Cell::Number(*n)),
                Cell::Text(s) => parse_number(s).map(Cell::Number).ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            ColumnKind::Boolean => match cell {
                Cell::Bool(b) => Ok(Cell::Bool(*b)),
                Cell::Text(s) => parse_bool(s).map(Cell::Bool).ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            ColumnKind::Temporal => match cell {
                Cell::Temporal(t) => Ok(Cell::Temporal(*t)),
                Cell::Text(s) => parse_temporal(s).map(Cell::Temporal).ok_or_else(mismatch),
                _ => Err(mismatch()),
            },
            ColumnKind::Categorical => {
                let rendered = match cell {
                    Cell::Text(s) => s.clone(),
                    other => other.to_string(),
                };
                match self.levels() {
                    Some(levels) if levels.iter().any(|l| *l == rendered) => {
                        Ok(Cell::Text(rendered))
                    }
                    _ => Err(ValueRejection::NotInDomain { value: rendered }),
                }
            }
            ColumnKind::Text => match cell {
                Cell::Text(s) => Ok(Cell::Text(s.clone())),
                other => Ok(Cell::Text(other.to_string())),
            },
        }
    }
}
