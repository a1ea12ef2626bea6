//! Writing a dataset back out as delimited text.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::dataset::Dataset;
use crate::error::{Result, SiftError};

/// Write `dataset` in base order with a header row.
///
/// Cells are rendered with their `Display` form, so nulls become empty fields.
pub fn write_delimited<W: Write>(dataset: &Dataset, writer: W, delimiter: u8) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(dataset.schema().column_names())?;
    for (_, row) in dataset.iter() {
        writer.write_record(row.cells().iter().map(|cell| cell.to_string()))?;
    }
    writer.flush().map_err(csv::Error::from)?;

    Ok(())
}

/// Write `dataset` to a file.
pub fn save_delimited(path: impl AsRef<Path>, dataset: &Dataset, delimiter: u8) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|source| SiftError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    write_delimited(dataset, file, delimiter)?;
    tracing::debug!(path = %path.display(), rows = dataset.len(), "saved dataset");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Cell, Schema};
    use crate::profile::TypeProfile;

    fn sample() -> Dataset {
        let schema = Schema::new()
            .with_column("name", TypeProfile::text())
            .with_column("age", TypeProfile::numeric(1.5, 40.0).with_nullable(true));
        Dataset::from_rows(
            schema,
            vec![
                vec![Cell::text("Ann, Jr."), Cell::Number(40.0)],
                vec![Cell::text("Bo"), Cell::Null],
                vec![Cell::text("Cy"), Cell::Number(1.5)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_write_csv() {
        let mut out = Vec::new();
        write_delimited(&sample(), &mut out, b',').unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name,age\n\"Ann, Jr.\",40\nBo,\nCy,1.5\n"
        );
    }

    #[test]
    fn test_save_tsv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");

        save_delimited(&path, &sample(), b'\t').unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("name\tage\n"));
        assert!(written.contains("Bo\t\n"));
    }
}
