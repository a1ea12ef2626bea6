//! Delimited-text reader with delimiter detection.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::source::{DataTable, SourceMetadata};
use crate::error::{Result, SiftError};

/// Candidates for auto-detection, in tie-break order.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Options for reading delimited files.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Fixed delimiter; detected from the first lines when `None`.
    pub delimiter: Option<u8>,
    pub has_header: bool,
    /// Stop after this many records.
    pub max_rows: Option<usize>,
    pub quote: u8,
    /// Lowercase column names as they are read.
    pub lowercase_headers: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
            lowercase_headers: false,
        }
    }
}

impl ParserConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn with_lowercase_headers(mut self, lowercase: bool) -> Self {
        self.lowercase_headers = lowercase;
        self
    }
}

/// Reads delimited files into [`DataTable`]s.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Read, hash and split a delimited file.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(DataTable, SourceMetadata)> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|source| SiftError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };
        let table = self.parse_bytes(&contents, delimiter)?;
        let source = SourceMetadata::describe(path, &contents, delimiter, &table);

        tracing::debug!(
            file = %source.file,
            rows = source.row_count,
            columns = source.column_count,
            format = %source.format,
            "parsed source file"
        );

        Ok((table, source))
    }

    /// Split `bytes` on a known delimiter.
    ///
    /// Without a header row, columns are named `column_1`, `column_2`, ...
    /// after the width of the first record.
    pub fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<DataTable> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .quote(self.config.quote)
            .flexible(true)
            .from_reader(bytes);

        let named: Option<Vec<String>> = if self.config.has_header {
            Some(reader.headers()?.iter().map(str::to_string).collect())
        } else {
            None
        };
        let records = reader
            .into_records()
            .take(self.config.max_rows.unwrap_or(usize::MAX))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let Some(first) = records.first() else {
            return Err(SiftError::EmptyData("No data rows found".to_string()));
        };
        let mut headers =
            named.unwrap_or_else(|| (1..=first.len()).map(|i| format!("column_{}", i)).collect());
        if headers.iter().all(|h| h.is_empty()) {
            return Err(SiftError::EmptyData("No columns found".to_string()));
        }
        if self.config.lowercase_headers {
            headers.iter_mut().for_each(|h| *h = h.to_lowercase());
        }

        let mut table = DataTable::new(headers);
        for record in &records {
            table.push_record(record.iter());
        }
        Ok(table)
    }
}

/// Pick the candidate that splits the first lines most consistently.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let lines: Vec<String> = BufReader::new(bytes)
        .lines()
        .map_while(|line| line.ok())
        .filter(|line| !line.trim().is_empty())
        .take(10)
        .collect();
    if lines.is_empty() {
        return Err(SiftError::EmptyData("No lines to analyze".to_string()));
    }

    // `rev` so that ties go to the earlier candidate.
    let best = DELIMITERS
        .iter()
        .rev()
        .filter_map(|&delimiter| {
            let counts: Vec<usize> = lines.iter().map(|l| count_unquoted(l, delimiter)).collect();
            (counts[0] > 0).then(|| (split_score(&counts, delimiter), delimiter))
        })
        .max_by_key(|(score, _)| *score);

    Ok(best.map_or(b',', |(_, delimiter)| delimiter))
}

/// Uniform field counts beat near-uniform ones, which beat ragged ones.
fn split_score(counts: &[usize], delimiter: u8) -> usize {
    let first = counts[0];
    if counts.iter().all(|&c| c == first) {
        return first * 1000 + if delimiter == b'\t' { 100 } else { 0 };
    }

    let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
    let variance = counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64;
    if variance < 1.0 { first * 100 } else { first }
}

/// Occurrences of `delimiter` outside double quotes.
fn count_unquoted(line: &str, delimiter: u8) -> usize {
    let delimiter = delimiter as char;
    line.chars()
        .scan(false, |quoted, ch| {
            if ch == '"' {
                *quoted = !*quoted;
            }
            Some(!*quoted && ch == delimiter)
        })
        .filter(|hit| *hit)
        .count()
}
