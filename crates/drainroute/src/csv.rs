//! Semicolon-delimited CSV scaffolding shared by all input loaders.
//!
//! Every input file has one header line (skipped unparsed) and tolerates
//! empty lines. Fields are read left to right through a [`Row`] cursor so a
//! malformed field is reported with its file, line number, and column name.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Field delimiter used by every input file.
const DELIMITER: char = ';';

/// A loaded CSV file: display label plus its non-empty data rows.
pub struct CsvFile {
    label: String,
    rows: Vec<(usize, String)>,
}

/// Read a CSV file into memory, skipping the header and empty lines.
///
/// `label` is the name used in error messages (typically the bare file name).
pub fn load(path: &Path, label: &str) -> Result<CsvFile> {
    let contents = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows = rows_of(&contents);
    Ok(CsvFile {
        label: label.to_string(),
        rows,
    })
}

/// Build a CSV file from in-memory contents. Used by loader tests.
pub fn from_str(contents: &str, label: &str) -> CsvFile {
    CsvFile {
        label: label.to_string(),
        rows: rows_of(contents),
    }
}

fn rows_of(contents: &str) -> Vec<(usize, String)> {
    contents
        .lines()
        .enumerate()
        .skip(1)
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| (idx + 1, line.to_string()))
        .collect()
}

impl CsvFile {
    /// Iterate over data rows as field cursors.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(|(line, text)| Row {
            file: &self.label,
            line: *line,
            fields: text.split(DELIMITER),
        })
    }
}

/// A cursor over the fields of one data row.
pub struct Row<'a> {
    file: &'a str,
    line: usize,
    fields: std::str::Split<'a, char>,
}

impl<'a> Row<'a> {
    /// 1-based line number of this row in the file.
    pub fn line(&self) -> usize {
        self.line
    }

    /// Read the next field as trimmed text. An exhausted row yields an empty
    /// field, so optional trailing columns parse as empty strings.
    pub fn field(&mut self, _column: &str) -> &'a str {
        self.fields.next().unwrap_or("").trim()
    }

    /// Read and parse the next field, attributing failures to `column`.
    pub fn parse<T: FromStr>(&mut self, column: &str) -> Result<T> {
        let text = self.field(column);
        text.parse().map_err(|_| {
            self.error(
                column,
                if text.is_empty() {
                    "field is missing".to_string()
                } else {
                    format!("cannot parse \"{text}\"")
                },
            )
        })
    }

    /// Build a parse error for `column` on this row.
    pub fn error(&self, column: &str, reason: impl Into<String>) -> Error {
        Error::Parse {
            file: self.file.to_string(),
            line: self.line,
            column: column.to_string(),
            reason: reason.into(),
        }
    }
}
