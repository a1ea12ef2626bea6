//! CLI command implementations.

pub mod args;
pub mod edit;
pub mod filter;
pub mod profile;

use std::path::Path;

use sift::{Dataset, Predicate, ProfileConfig, Sift, SiftConfig, SourceMetadata};

use args::{parse_declaration, parse_where};

/// Load a data file, applying any `--declare` overrides.
pub fn open(
    file: &Path,
    declare: &[String],
) -> Result<(Sift, Dataset, SourceMetadata), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Data file not found: {}", file.display()).into());
    }

    let mut profile = ProfileConfig::default();
    for expr in declare {
        let (column, declaration) = parse_declaration(expr)?;
        profile = profile.with_declaration(column, declaration);
    }

    let sift = Sift::with_config(SiftConfig::default().with_profile(profile));
    let (dataset, source) = sift.load(file)?;
    Ok((sift, dataset, source))
}

/// Build predicates from `--where` expressions.
pub fn predicates(
    sift: &Sift,
    dataset: &Dataset,
    filters: &[String],
) -> Result<Vec<Predicate>, Box<dyn std::error::Error>> {
    let mut predicates = Vec::with_capacity(filters.len());
    for expr in filters {
        let clause = parse_where(expr)?;
        predicates.push(sift.build_predicate(dataset, &clause.column, clause.shape, clause.params)?);
    }
    Ok(predicates)
}
