//! Profile command - show column kinds, domains and legal filter shapes.

use std::path::PathBuf;

use colored::Colorize;
use sift::{Cell, Domain, PredicateBuilder, TypeProfile};

pub fn run(
    file: PathBuf,
    json_output: bool,
    declare: Vec<String>,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (_, dataset, source) = super::open(&file, &declare)?;

    if json_output {
        let columns: Vec<_> = dataset
            .schema()
            .iter()
            .map(|(name, profile)| {
                serde_json::json!({
                    "name": name,
                    "profile": profile,
                    "shapes": PredicateBuilder::legal_shapes(profile),
                })
            })
            .collect();
        let output = serde_json::json!({
            "file": source.file,
            "hash": source.hash,
            "rows": dataset.len(),
            "columns": columns,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {})",
        "Profile of".cyan().bold(),
        source.file.white(),
        dataset.len(),
        source.format
    );
    println!();

    for (name, profile) in dataset.schema().iter() {
        let shapes: Vec<&str> = PredicateBuilder::legal_shapes(profile)
            .iter()
            .map(|s| s.label())
            .collect();
        let nullable = if profile.nullable { " nullable" } else { "" };

        println!(
            "  {:<20} {}{}",
            name.white().bold(),
            profile.kind.to_string().yellow(),
            nullable.dimmed()
        );
        if let Some(domain) = describe_domain(profile) {
            println!("  {:<20} {}", "", domain);
        }
        println!("  {:<20} {}", "", format!("filters: {}", shapes.join(", ")).dimmed());
    }

    Ok(())
}

fn describe_domain(profile: &TypeProfile) -> Option<String> {
    match &profile.domain {
        Domain::None => None,
        Domain::Levels { levels, ordered } => {
            let sep = if *ordered { " < " } else { ", " };
            Some(format!("levels: {}", levels.join(sep)))
        }
        Domain::NumericRange { min, max } => Some(format!(
            "range: {} .. {}",
            Cell::Number(*min),
            Cell::Number(*max)
        )),
        Domain::TemporalRange { min, max } => Some(format!(
            "range: {} .. {}",
            Cell::Temporal(*min),
            Cell::Temporal(*max)
        )),
    }
}
