//! Column classification: kind inference and domain extraction.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SiftError};

use super::parse::{is_null_value, parse_bool, parse_number, parse_temporal};
use super::types::{ColumnKind, Domain, TypeProfile};

/// Maximum offending values quoted in an `AmbiguousType` error.
const MAX_REPORTED_VALUES: usize = 5;

/// An explicit type demand for a column, overriding inference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnDeclaration {
    Numeric,
    Boolean,
    Temporal,
    Text,
    /// Categorical column. Without `levels` the levels are taken from the data.
    Categorical {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        levels: Option<Vec<String>>,
        #[serde(default)]
        ordered: bool,
    },
}

impl ColumnDeclaration {
    fn label(&self) -> &'static str {
        match self {
            ColumnDeclaration::Numeric => "numeric",
            ColumnDeclaration::Boolean => "boolean",
            ColumnDeclaration::Temporal => "temporal",
            ColumnDeclaration::Text => "text",
            ColumnDeclaration::Categorical { .. } => "categorical",
        }
    }
}

/// Configuration for column profiling.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    /// Distinct/non-null ratio at or below which a column is categorical.
    pub categorical_ratio: f64,
    /// Maximum levels a categorical column may have.
    pub max_levels: usize,
    /// Minimum non-null values before cardinality inference applies.
    pub min_rows_for_categorical: usize,
    /// Whether low-cardinality numeric columns become categorical.
    pub infer_categorical_numbers: bool,
    /// Explicit per-column type demands.
    pub declarations: IndexMap<String, ColumnDeclaration>,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            categorical_ratio: 0.5,
            max_levels: 20,
            min_rows_for_categorical: 2,
            infer_categorical_numbers: false,
            declarations: IndexMap::new(),
        }
    }
}

impl ProfileConfig {
    /// Create a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an explicit kind for a column.
    pub fn with_declaration(
        mut self,
        column: impl Into<String>,
        declaration: ColumnDeclaration,
    ) -> Self {
        self.declarations.insert(column.into(), declaration);
        self
    }

    /// Set the categorical cardinality ratio.
    pub fn with_categorical_ratio(mut self, ratio: f64) -> Self {
        self.categorical_ratio = ratio;
        self
    }

    /// Set the maximum number of categorical levels.
    pub fn with_max_levels(mut self, max_levels: usize) -> Self {
        self.max_levels = max_levels;
        self
    }

    /// Allow low-cardinality numeric columns to be profiled as categorical.
    pub fn with_categorical_numbers(mut self, enabled: bool) -> Self {
        self.infer_categorical_numbers = enabled;
        self
    }
}

/// Classifies columns into [`TypeProfile`]s.
///
/// Profiling is a pure function of the column values and the configuration.
pub struct TypeProfiler {
    config: ProfileConfig,
}

impl TypeProfiler {
    /// Create a profiler with default settings.
    pub fn new() -> Self {
        Self::with_config(ProfileConfig::default())
    }

    /// Create a profiler with custom configuration.
    pub fn with_config(config: ProfileConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &ProfileConfig {
        &self.config
    }

    /// Profile a named column, honouring any declaration for it.
    pub fn profile(&self, column: &str, values: &[&str]) -> Result<TypeProfile> {
        match self.config.declarations.get(column) {
            Some(declaration) => self.profile_as(column, values, declaration),
            None => Ok(self.infer(values)),
        }
    }

    /// Infer a profile from the values alone.
    ///
    /// Order: boolean, temporal, numeric, low-cardinality categorical, text.
    /// A column with no non-null values is text.
    pub fn infer(&self, values: &[&str]) -> TypeProfile {
        let (non_null, nullable) = split_nulls(values);

        let profile = if non_null.is_empty() {
            TypeProfile::text()
        } else if non_null.iter().all(|v| parse_bool(v).is_some()) {
            TypeProfile::boolean()
        } else if let Some((min, max)) = temporal_range(&non_null) {
            TypeProfile::temporal(min, max)
        } else if let Some((min, max)) = numeric_range(&non_null) {
            match self.low_cardinality_levels(&non_null) {
                Some(levels) if self.config.infer_categorical_numbers => {
                    TypeProfile::categorical(levels)
                }
                _ => TypeProfile::numeric(min, max),
            }
        } else if let Some(levels) = self.low_cardinality_levels(&non_null) {
            TypeProfile::categorical(levels)
        } else {
            TypeProfile::text()
        };

        tracing::debug!(
            kind = %profile.kind,
            values = values.len(),
            nullable,
            "inferred column profile"
        );

        profile.with_nullable(nullable)
    }

    /// Profile a column under an explicit type demand.
    ///
    /// Fails with `AmbiguousType` if the data cannot support the demand.
    pub fn profile_as(
        &self,
        column: &str,
        values: &[&str],
        declaration: &ColumnDeclaration,
    ) -> Result<TypeProfile> {
        let (non_null, nullable) = split_nulls(values);
        let ambiguous = |reason: String| SiftError::AmbiguousType {
            column: column.to_string(),
            requested: declaration.label().to_string(),
            reason,
        };

        let profile = match declaration {
            ColumnDeclaration::Text => TypeProfile::text(),
            ColumnDeclaration::Boolean => {
                let bad = offending(&non_null, |v| parse_bool(v).is_none());
                if !bad.is_empty() {
                    return Err(ambiguous(format!("not boolean: {}", quote_all(&bad))));
                }
                TypeProfile::boolean()
            }
            ColumnDeclaration::Numeric => {
                let bad = offending(&non_null, |v| parse_number(v).is_none());
                if !bad.is_empty() {
                    return Err(ambiguous(format!("not numeric: {}", quote_all(&bad))));
                }
                let (min, max) = numeric_range(&non_null).unwrap_or((0.0, 0.0));
                TypeProfile::numeric(min, max)
            }
            ColumnDeclaration::Temporal => {
                let bad = offending(&non_null, |v| parse_temporal(v).is_none());
                if !bad.is_empty() {
                    return Err(ambiguous(format!("not a date: {}", quote_all(&bad))));
                }
                match temporal_range(&non_null) {
                    Some((min, max)) => TypeProfile::temporal(min, max),
                    None => {
                        return Err(ambiguous("no values to establish a range".to_string()));
                    }
                }
            }
            ColumnDeclaration::Categorical {
                levels: Some(levels),
                ordered,
            } => {
                if levels.is_empty() {
                    return Err(ambiguous("declared level list is empty".to_string()));
                }
                let unique: IndexSet<&str> = levels.iter().map(String::as_str).collect();
                if unique.len() != levels.len() {
                    return Err(ambiguous("declared levels contain duplicates".to_string()));
                }
                let bad = offending(&non_null, |v| !unique.contains(v));
                if !bad.is_empty() {
                    return Err(ambiguous(format!(
                        "values outside declared levels: {}",
                        quote_all(&bad)
                    )));
                }
                categorical(levels.clone(), *ordered)
            }
            ColumnDeclaration::Categorical {
                levels: None,
                ordered,
            } => {
                let mut levels: Vec<String> = distinct(&non_null)
                    .into_iter()
                    .map(str::to_string)
                    .collect();
                if *ordered {
                    levels.sort();
                }
                categorical(levels, *ordered)
            }
        };

        tracing::debug!(column, kind = %profile.kind, "profiled declared column");
        Ok(profile.with_nullable(nullable))
    }

    /// Levels for a low-cardinality column, in order of first appearance.
    fn low_cardinality_levels(&self, non_null: &[&str]) -> Option<Vec<String>> {
        if non_null.len() < self.config.min_rows_for_categorical {
            return None;
        }
        let levels = distinct(non_null);
        let ratio = levels.len() as f64 / non_null.len() as f64;
        if levels.len() <= self.config.max_levels && ratio <= self.config.categorical_ratio {
            Some(levels.into_iter().map(str::to_string).collect())
        } else {
            None
        }
    }
}

impl Default for TypeProfiler {
    fn default() -> Self {
        Self::new()
    }
}

fn categorical(levels: Vec<String>, ordered: bool) -> TypeProfile {
    if ordered {
        TypeProfile::ordered_categorical(levels)
    } else {
        TypeProfile::categorical(levels)
    }
}

/// Trimmed non-null values and whether any nulls were present.
fn split_nulls<'a>(values: &[&'a str]) -> (Vec<&'a str>, bool) {
    let non_null: Vec<&str> = values
        .iter()
        .filter(|v| !is_null_value(v))
        .map(|v| v.trim())
        .collect();
    let nullable = non_null.len() < values.len();
    (non_null, nullable)
}

fn distinct<'a>(values: &[&'a str]) -> IndexSet<&'a str> {
    values.iter().copied().collect()
}

fn offending<'a>(values: &[&'a str], is_bad: impl Fn(&str) -> bool) -> Vec<&'a str> {
    let bad: IndexSet<&str> = values.iter().copied().filter(|v| is_bad(v)).collect();
    bad.into_iter().take(MAX_REPORTED_VALUES).collect()
}

fn quote_all(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(", ")
}

fn numeric_range(values: &[&str]) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for value in values {
        let n = parse_number(value)?;
        range = Some(match range {
            Some((min, max)) => (min.min(n), max.max(n)),
            None => (n, n),
        });
    }
    range
}

fn temporal_range(
    values: &[&str],
) -> Option<(chrono::NaiveDateTime, chrono::NaiveDateTime)> {
    let mut range = None;
    for value in values {
        let t = parse_temporal(value)?;
        range = Some(match range {
            Some((min, max)) => (std::cmp::min(min, t), std::cmp::max(max, t)),
            None => (t, t),
        });
    }
    range
}
