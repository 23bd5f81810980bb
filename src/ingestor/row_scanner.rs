use std::io::{BufRead, Lines};
use tracing::error;

use crate::errors::{ImportError, ImportResult};

/// Column separator of EDM files
pub const DELIMITER: char = '|';
/// Optional wrapper around each field
pub const QUOTE: char = '"';
/// Name every EDM header must start with
pub const KEY_COLUMN: &str = "FACTSET_ENTITY_ID";

/// Forward-only scanner over a pipe-delimited EDM file.
///
/// The header is consumed and validated on construction. Fields are split on
/// [`DELIMITER`] and lose one [`QUOTE`] at each end when wrapped; embedded
/// delimiters and quotes are not escaped in this format. A read error after
/// the header is logged and ends the sequence.
pub struct RowScanner<R> {
    file: String,
    header: Vec<String>,
    lines: Lines<R>,
    line: usize,
    finished: bool,
}

impl<R: BufRead> RowScanner<R> {
    pub fn new(file: impl Into<String>, reader: R) -> ImportResult<Self> {
        let file = file.into();
        let mut lines = reader.lines();

        let header = match lines.next() {
            Some(line) => split_row(&line?),
            None => return Err(ImportError::format(file, "missing header line")),
        };

        if header.first().map(String::as_str) != Some(KEY_COLUMN) {
            return Err(ImportError::format(
                file,
                format!(
                    "header must start with {}, found {:?}",
                    KEY_COLUMN,
                    header.first().map(String::as_str).unwrap_or_default()
                ),
            ));
        }

        Ok(Self {
            file,
            header,
            lines,
            line: 1,
            finished: false,
        })
    }

    /// Column names from the header line, unquoted
    pub fn header(&self) -> &[String] {
        &self.header
    }

    /// One-based line number of the row most recently returned
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for RowScanner<R> {
    type Item = Vec<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.lines.next() {
            Some(Ok(line)) => {
                self.line += 1;
                Some(split_row(&line))
            }
            Some(Err(e)) => {
                error!("Error reading {} after line {}: {}", self.file, self.line, e);
                self.finished = true;
                None
            }
            None => {
                self.finished = true;
                None
            }
        }
    }
}

/// Split one line into unquoted fields
pub fn split_row(line: &str) -> Vec<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    line.split(DELIMITER).map(unquote).collect()
}

fn unquote(field: &str) -> String {
    if field.len() >= 2 && field.starts_with(QUOTE) && field.ends_with(QUOTE) {
        field[1..field.len() - 1].to_string()
    } else {
        field.to_string()
    }
}
