//! Predicate construction and validation against column profiles.

use indexmap::IndexSet;

use crate::dataset::Cell;
use crate::error::{Result, SiftError};
use crate::profile::{ColumnKind, Domain, TypeProfile};

use super::predicate::{Condition, Predicate};
use super::shape::{PredicateParams, PredicateShape};

/// Builds [`Predicate`]s, rejecting parameters outside a column's domain.
///
/// Validation happens here, before any view is computed; nothing is clamped.
#[derive(Debug, Clone, Default)]
pub struct PredicateBuilder {
    allow_out_of_range: bool,
}

impl PredicateBuilder {
    /// Create a builder that rejects out-of-range bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept numeric/temporal bounds outside the observed range, flagging
    /// the resulting predicate instead of rejecting it.
    pub fn allow_out_of_range(mut self, allow: bool) -> Self {
        self.allow_out_of_range = allow;
        self
    }

    /// Shapes that are legal for a column profile.
    pub fn legal_shapes(profile: &TypeProfile) -> Vec<PredicateShape> {
        let mut shapes = match profile.kind {
            ColumnKind::Numeric | ColumnKind::Temporal => vec![PredicateShape::Range],
            ColumnKind::Categorical if profile.is_ordered() => {
                vec![PredicateShape::Membership, PredicateShape::Range]
            }
            ColumnKind::Categorical => vec![PredicateShape::Membership],
            ColumnKind::Text => vec![PredicateShape::Substring],
            ColumnKind::Boolean => vec![PredicateShape::Equality],
        };
        shapes.push(PredicateShape::IsNull);
        shapes
    }

    /// Build a predicate for `column`, validating `params` against `profile`.
    pub fn build(
        &self,
        column: &str,
        profile: &TypeProfile,
        shape: PredicateShape,
        params: PredicateParams,
    ) -> Result<Predicate> {
        if !Self::legal_shapes(profile).contains(&shape) {
            return Err(SiftError::invalid_predicate(
                column,
                format!("{} is not a legal shape for a {} column", shape, profile.kind),
                vec![shape.label().to_string()],
            ));
        }
        if params.shape() != shape {
            return Err(SiftError::invalid_predicate(
                column,
                format!("{} parameters supplied for a {} predicate", params.shape(), shape),
                Vec::new(),
            ));
        }

        let mut out_of_domain = false;
        let condition = match params {
            PredicateParams::Range { min, max } => match profile.kind {
                ColumnKind::Numeric => {
                    let (min, max, flagged) = self.numeric_bounds(column, profile, &min, &max)?;
                    out_of_domain = flagged;
                    Condition::NumberRange { min, max }
                }
                ColumnKind::Temporal => {
                    let (min, max, flagged) = self.temporal_bounds(column, profile, &min, &max)?;
                    out_of_domain = flagged;
                    Condition::TemporalRange { min, max }
                }
                _ => level_range(column, profile, &min, &max)?,
            },
            PredicateParams::Membership { levels } => {
                let domain = profile.levels().unwrap_or(&[]);
                let rejected: Vec<String> = levels
                    .iter()
                    .filter(|level| !domain.contains(level))
                    .cloned()
                    .collect();
                if !rejected.is_empty() {
                    return Err(SiftError::invalid_predicate(
                        column,
                        format!("levels not in domain: {}", rejected.join(", ")),
                        rejected,
                    ));
                }
                Condition::Levels {
                    levels: levels.into_iter().collect(),
                }
            }
            PredicateParams::Substring { needle } => Condition::Contains {
                needle: needle.to_lowercase(),
            },
            PredicateParams::Equality { value } => Condition::Equals { value },
            PredicateParams::IsNull => Condition::IsNull,
        };

        if out_of_domain {
            tracing::warn!(column, "predicate bounds exceed observed range");
        }

        Ok(Predicate::new(
            column.to_string(),
            shape,
            condition,
            profile.clone(),
            out_of_domain,
        ))
    }

    fn numeric_bounds(
        &self,
        column: &str,
        profile: &TypeProfile,
        min: &Cell,
        max: &Cell,
    ) -> Result<(f64, f64, bool)> {
        let (min, max) = parse_bounds(column, profile, min, max, |c| c.as_number())?;
        if min > max {
            return Err(inverted(column, min, max));
        }

        let outside: Vec<f64> = match profile.domain {
            Domain::NumericRange { min: lo, max: hi } => [min, max]
                .into_iter()
                .filter(|v| *v < lo || *v > hi)
                .collect(),
            _ => Vec::new(),
        };
        let flagged = self.check_range(column, outside.iter().map(|v| Cell::Number(*v)))?;
        Ok((min, max, flagged))
    }

    fn temporal_bounds(
        &self,
        column: &str,
        profile: &TypeProfile,
        min: &Cell,
        max: &Cell,
    ) -> Result<(chrono::NaiveDateTime, chrono::NaiveDateTime, bool)> {
        let (min, max) = parse_bounds(column, profile, min, max, |c| c.as_temporal())?;
        if min > max {
            return Err(inverted(column, Cell::Temporal(min), Cell::Temporal(max)));
        }

        let outside: Vec<chrono::NaiveDateTime> = match profile.domain {
            Domain::TemporalRange { min: lo, max: hi } => [min, max]
                .into_iter()
                .filter(|v| *v < lo || *v > hi)
                .collect(),
            _ => Vec::new(),
        };
        let flagged = self.check_range(column, outside.into_iter().map(Cell::Temporal))?;
        Ok((min, max, flagged))
    }

    /// Reject out-of-range bounds unless overridden; returns whether to flag.
    fn check_range(&self, column: &str, outside: impl Iterator<Item = Cell>) -> Result<bool> {
        let rejected: Vec<String> = outside.map(|c| c.to_string()).collect();
        if rejected.is_empty() {
            return Ok(false);
        }
        if self.allow_out_of_range {
            return Ok(true);
        }
        Err(SiftError::invalid_predicate(
            column,
            format!("bounds outside observed range: {}", rejected.join(", ")),
            rejected,
        ))
    }
}

/// Coerce both bounds through the profile and extract them.
fn parse_bounds<T>(
    column: &str,
    profile: &TypeProfile,
    min: &Cell,
    max: &Cell,
    extract: impl Fn(&Cell) -> Option<T>,
) -> Result<(T, T)> {
    let mut rejected = Vec::new();
    let mut parse = |bound: &Cell| match profile.coerce(bound).ok().as_ref().and_then(&extract) {
        Some(value) => Some(value),
        None => {
            rejected.push(bound.to_string());
            None
        }
    };
    let parsed = (parse(min), parse(max));

    match parsed {
        (Some(min), Some(max)) => Ok((min, max)),
        _ => Err(SiftError::invalid_predicate(
            column,
            format!("bounds are not {} values: {}", profile.kind, rejected.join(", ")),
            rejected,
        )),
    }
}

fn inverted(column: &str, min: impl Into<Cell>, max: impl Into<Cell>) -> SiftError {
    let (min, max) = (min.into().to_string(), max.into().to_string());
    SiftError::invalid_predicate(
        column,
        format!("min {} is greater than max {}", min, max),
        vec![min, max],
    )
}

/// Range over an ordered categorical: every level between the bounds.
fn level_range(column: &str, profile: &TypeProfile, min: &Cell, max: &Cell) -> Result<Condition> {
    let levels = profile.levels().unwrap_or(&[]);
    let position = |bound: &Cell| {
        let rendered = bound.to_string();
        levels.iter().position(|l| *l == rendered)
    };

    match (position(min), position(max)) {
        (Some(lo), Some(hi)) if lo <= hi => Ok(Condition::Levels {
            levels: levels[lo..=hi].iter().cloned().collect::<IndexSet<_>>(),
        }),
        (Some(_), Some(_)) => Err(inverted(column, min.clone(), max.clone())),
        (lo, hi) => {
            let mut rejected = Vec::new();
            if lo.is_none() {
                rejected.push(min.to_string());
            }
            if hi.is_none() {
                rejected.push(max.to_string());
            }
            Err(SiftError::invalid_predicate(
                column,
                format!("levels not in domain: {}", rejected.join(", ")),
                rejected,
            ))
        }
    }
}
