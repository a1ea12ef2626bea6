//! Unprofiled string columns and a description of the file they came from.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Identifies the file a dataset was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without directories.
    pub file: String,
    /// `sha256:` digest of the raw bytes.
    pub hash: String,
    /// `csv`, `tsv`, `psv`, ...
    pub format: String,
    pub row_count: usize,
    pub column_count: usize,
}

impl SourceMetadata {
    /// Describe `contents`, read from `path` and split on `delimiter`.
    pub(crate) fn describe(path: &Path, contents: &[u8], delimiter: u8, table: &DataTable) -> Self {
        Self {
            file: path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
            hash: format!("sha256:{:x}", Sha256::digest(contents)),
            format: format_name(delimiter).to_string(),
            row_count: table.len(),
            column_count: table.width(),
        }
    }
}

/// Short name for the format implied by a delimiter.
fn format_name(delimiter: u8) -> &'static str {
    match delimiter {
        b'\t' => "tsv",
        b',' => "csv",
        b';' => "csv-semicolon",
        b'|' => "psv",
        _ => "delimited",
    }
}

/// Named columns of raw strings, stored column by column so each one can be
/// profiled without reshaping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataTable {
    headers: Vec<String>,
    columns: Vec<Vec<String>>,
}

impl DataTable {
    /// An empty table with the given column names.
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
        let columns = vec![Vec::new(); headers.len()];
        Self { headers, columns }
    }

    /// Build a table from headers and row-major records.
    pub fn from_records<H, I, R, S>(headers: H, records: I) -> Self
    where
        H: IntoIterator,
        H::Item: Into<String>,
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut table = Self::new(headers);
        for record in records {
            table.push_record(record);
        }
        table
    }

    /// Append one record. Missing trailing fields become empty strings and
    /// extra fields are dropped.
    pub fn push_record<R, S>(&mut self, record: R)
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut fields = record.into_iter();
        for column in &mut self.columns {
            column.push(fields.next().map(Into::into).unwrap_or_default());
        }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.columns.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Each header with its raw values, in column order.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(self.columns.iter().map(Vec::as_slice))
    }

    /// Raw value at (`row`, `column`).
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.columns.get(column)?.get(row).map(String::as_str)
    }
}
