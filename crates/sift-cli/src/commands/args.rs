//! Parsing of `--where` filters and `--declare` column declarations.

use sift::profile::parse_bool;
use sift::{Cell, ColumnDeclaration, PredicateParams, PredicateShape};

/// A parsed `--where` expression.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    pub column: String,
    pub shape: PredicateShape,
    pub params: PredicateParams,
}

/// Parse `COL:SHAPE=ARGS`.
///
/// Shapes: `range=MIN..MAX`, `in=A,B`, `contains=TEXT`, `eq=true|false`, `null`.
/// Range bounds stay as text and are parsed against the column's kind later.
pub fn parse_where(expr: &str) -> Result<WhereClause, String> {
    let (column, rest) = expr
        .split_once(':')
        .ok_or_else(|| format!("Invalid filter '{}': expected COL:SHAPE=ARGS", expr))?;
    if column.is_empty() {
        return Err(format!("Invalid filter '{}': missing column name", expr));
    }

    let (shape, args) = match rest.split_once('=') {
        Some((shape, args)) => (shape.trim(), args),
        None => (rest.trim(), ""),
    };

    let params = match shape.to_lowercase().as_str() {
        "range" => {
            let (min, max) = args
                .split_once("..")
                .ok_or_else(|| format!("Invalid range '{}': expected MIN..MAX", args))?;
            PredicateParams::range(Cell::text(min.trim()), Cell::text(max.trim()))
        }
        "in" => PredicateParams::membership(
            args.split(',')
                .map(str::trim)
                .filter(|level| !level.is_empty()),
        ),
        "contains" => PredicateParams::substring(args),
        "eq" => PredicateParams::Equality {
            value: parse_bool(args)
                .ok_or_else(|| format!("Invalid boolean '{}': expected true or false", args))?,
        },
        "null" => PredicateParams::IsNull,
        other => {
            return Err(format!(
                "Unknown filter shape '{}'. Use range, in, contains, eq, or null.",
                other
            ));
        }
    };

    Ok(WhereClause {
        column: column.to_string(),
        shape: params.shape(),
        params,
    })
}

/// Parse `COL=KIND[:level,level,...]`.
pub fn parse_declaration(expr: &str) -> Result<(String, ColumnDeclaration), String> {
    let (column, spec) = expr
        .split_once('=')
        .ok_or_else(|| format!("Invalid declaration '{}': expected COL=KIND", expr))?;
    let (kind, levels) = match spec.split_once(':') {
        Some((kind, levels)) => (kind, Some(levels)),
        None => (spec, None),
    };
    let levels = levels.map(|l| {
        l.split(',')
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .collect::<Vec<_>>()
    });

    let declaration = match (kind.trim().to_lowercase().as_str(), levels) {
        ("categorical", levels) => ColumnDeclaration::Categorical {
            levels,
            ordered: false,
        },
        ("ordered", levels) => ColumnDeclaration::Categorical {
            levels,
            ordered: true,
        },
        (_, Some(_)) => {
            return Err(format!("Only categorical declarations take levels: '{}'", expr));
        }
        ("numeric", None) => ColumnDeclaration::Numeric,
        ("boolean", None) => ColumnDeclaration::Boolean,
        ("temporal", None) => ColumnDeclaration::Temporal,
        ("text", None) => ColumnDeclaration::Text,
        (other, None) => {
            return Err(format!(
                "Unknown column kind '{}'. Use numeric, boolean, temporal, text, categorical, or ordered.",
                other
            ));
        }
    };

    Ok((column.trim().to_string(), declaration))
}
