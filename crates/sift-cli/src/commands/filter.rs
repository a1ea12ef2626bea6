//! Filter command - print the rows of a filtered view.

use std::path::PathBuf;

use colored::Colorize;

pub fn run(
    file: PathBuf,
    filters: Vec<String>,
    json_output: bool,
    limit: Option<usize>,
    declare: Vec<String>,
    _verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (sift, dataset, source) = super::open(&file, &declare)?;
    let predicates = super::predicates(&sift, &dataset, &filters)?;
    let view = sift.filter(&dataset, &predicates)?;
    let shown = limit.unwrap_or(view.len()).min(view.len());

    if json_output {
        let rows: Vec<_> = view
            .rows(&dataset)
            .take(shown)
            .map(|(id, row)| {
                let mut object = serde_json::Map::new();
                object.insert("row".to_string(), serde_json::json!(id.to_string()));
                for (name, cell) in dataset.schema().column_names().zip(row.cells()) {
                    object.insert(name.to_string(), serde_json::json!(cell));
                }
                serde_json::Value::Object(object)
            })
            .collect();
        let output = serde_json::json!({
            "file": source.file,
            "version": view.base_version(),
            "matched": view.len(),
            "total": dataset.len(),
            "rows": rows,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!(
        "{} {} of {} rows",
        "Matched".cyan().bold(),
        view.len().to_string().white().bold(),
        dataset.len()
    );
    println!();

    let header: Vec<&str> = dataset.schema().column_names().collect();
    println!("{}\t{}", "row".dimmed(), header.join("\t").bold());
    for (position, (id, row)) in view.rows(&dataset).take(shown).enumerate() {
        let values: Vec<String> = row.cells().iter().map(|c| c.to_string()).collect();
        println!("{}\t{}", format!("{}:{}", position, id).dimmed(), values.join("\t"));
    }

    if shown < view.len() {
        println!();
        println!("... {} more rows", view.len() - shown);
    }

    Ok(())
}
