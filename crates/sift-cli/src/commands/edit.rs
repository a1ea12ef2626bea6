//! Edit command - capture edits against a view, reconcile, and export.

use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use colored::Colorize;
use sift::{EditOperation, ReconcileStatus, Resolution};

use crate::cli::OutputFormat;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    filters: Vec<String>,
    edits: PathBuf,
    output: Option<PathBuf>,
    format: OutputFormat,
    json_output: bool,
    declare: Vec<String>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (sift, dataset, _) = super::open(&file, &declare)?;
    let predicates = super::predicates(&sift, &dataset, &filters)?;
    let view = sift.filter(&dataset, &predicates)?;

    if !edits.exists() {
        return Err(format!("Edits file not found: {}", edits.display()).into());
    }
    let operations: Vec<EditOperation> =
        serde_json::from_reader(BufReader::new(File::open(&edits)?))?;

    let mut ledger = sift.ledger(&view);
    for (index, operation) in operations.into_iter().enumerate() {
        ledger
            .capture(operation)
            .map_err(|e| format!("Edit #{}: {}", index, e))?;
    }
    let captured = ledger.len();
    tracing::debug!(file = %edits.display(), captured, "captured edits");
    let (updated, report) = sift.reconcile(&dataset, ledger.finalize())?;

    let output_path = output.unwrap_or_else(|| {
        let stem = file.file_stem().unwrap_or_default().to_string_lossy();
        file.with_file_name(format!("{}_edited.{}", stem, format))
    });
    sift::export::save_delimited(&output_path, &updated, format.delimiter())?;

    if json_output {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} edits against {} of {} rows",
        "Reconciled".cyan().bold(),
        captured.to_string().white().bold(),
        view.len(),
        dataset.len()
    );
    println!("  Applied:  {}", report.applied.to_string().green());
    println!("  Inserted: {}", report.inserted.len());
    println!("  Deleted:  {}", report.deleted.len());
    println!("  Version:  {}", report.version);

    if verbose {
        for change in &report.changes {
            println!(
                "    {} {}: {} -> {}",
                change.row.to_string().dimmed(),
                change.column,
                change.old.to_string().red(),
                change.new.to_string().green()
            );
        }
    }

    match report.status() {
        ReconcileStatus::FullyApplied => {
            println!();
            println!("{} All edits applied.", "Done:".green().bold());
        }
        ReconcileStatus::AppliedWithConflicts(count) => {
            println!();
            println!("{} {} conflicts", "Warning:".yellow().bold(), count);
            for conflict in &report.conflicts {
                let marker = match conflict.resolution {
                    Resolution::Skipped => "skipped".red(),
                    Resolution::AppendedAtEnd => "appended".yellow(),
                };
                println!(
                    "  [{}] #{} {}: {}",
                    marker,
                    conflict.index,
                    conflict.operation.description(),
                    conflict.reason
                );
            }
        }
    }

    println!(
        "Saved edited data to: {}",
        output_path.display().to_string().cyan()
    );

    Ok(())
}
