//! Whitespace separated numeric tables

// standard library
use std::path::Path;

// crate modules
use crate::error::{Error, Result};

// external crates
use log::trace;

// nom parser combinators
use nom::character::complete::space0;
use nom::combinator::all_consuming;
use nom::multi::many1;
use nom::number::complete::double;
use nom::sequence::terminated;
use nom::IResult;

/// Named columns of floating point values
///
/// ```rust
/// # use hfxs_theory::Table;
/// let table = Table::parse("
/// # FONLL output
/// # pt central min max
///   1.0  10.0  8.0  12.0
///   2.0   5.0  4.0   6.5
/// ").unwrap();
///
/// assert_eq!(table.header, vec!["pt", "central", "min", "max"]);
/// assert_eq!(table.column("central").unwrap(), vec![10.0, 5.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    /// Column names
    pub header: Vec<String>,
    /// Data rows, each as long as the header
    pub rows: Vec<Vec<f64>>,
}

impl Table {
    /// Read a table, taking column names from the file
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Read a table without a header, using the given column names
    pub fn read_headless<P: AsRef<Path>>(path: P, names: &[&str]) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse_headless(&text, names)
    }

    /// Parse a table, taking column names from the text
    ///
    /// The names are the last non-numeric line before the first data row,
    /// with any leading `#` removed. Comments after the data has started are
    /// skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match data_row(line) {
                Some(values) => {
                    let Some(names) = &header else {
                        return Err(Error::MissingHeader { line: n + 1 });
                    };
                    check_row(n + 1, names.len(), values.len())?;
                    rows.push(values);
                }
                None if rows.is_empty() => {
                    header = Some(column_names(line));
                }
                None => trace!("Skipping line {} after data: {line}", n + 1),
            }
        }

        let header = header.unwrap_or_default();
        finish(header, rows)
    }

    /// Parse a table with no header, using the given column names
    ///
    /// All comment lines are ignored.
    ///
    /// ```rust
    /// # use hfxs_theory::Table;
    /// let names = ["central", "err_low", "err_high"];
    /// let table = Table::parse_headless("# nnlo\n1.5 -0.2 0.3\n", &names).unwrap();
    /// assert_eq!(table.column("err_low").unwrap(), vec![-0.2]);
    /// ```
    pub fn parse_headless(text: &str, names: &[&str]) -> Result<Self> {
        let mut rows = Vec::new();
        for (n, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let (_, values) = all_consuming(vector_of_f64)(line)?;
            check_row(n + 1, names.len(), values.len())?;
            rows.push(values);
        }

        let header = names.iter().map(|s| s.to_string()).collect();
        finish(header, rows)
    }

    /// Index of a named column
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// True if the named column exists
    pub fn has_column(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Copy of a named column
    pub fn column(&self, name: &str) -> Result<Vec<f64>> {
        let index = self.index_of(name).ok_or_else(|| Error::MissingColumn {
            name: name.to_string(),
        })?;
        Ok(self.rows.iter().map(|row| row[index]).collect())
    }

    /// Number of data rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// True if there are no data rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn finish(header: Vec<String>, rows: Vec<Vec<f64>>) -> Result<Table> {
    if rows.is_empty() {
        return Err(Error::EmptyTable);
    }
    Ok(Table { header, rows })
}

fn check_row(line: usize, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(Error::RowLength {
            line,
            expected,
            found,
        });
    }
    Ok(())
}

/// Values of a line made up only of numbers
fn data_row(line: &str) -> Option<Vec<f64>> {
    if line.starts_with('#') {
        return None;
    }
    all_consuming(vector_of_f64)(line).ok().map(|(_, v)| v)
}

/// List of consecutive doubles as a vector of f64 values
fn vector_of_f64(i: &str) -> IResult<&str, Vec<f64>> {
    many1(terminated(double, space0))(i.trim_start())
}

/// Whitespace separated names with the comment marker removed
fn column_names(line: &str) -> Vec<String> {
    line.trim_start_matches('#')
        .split_whitespace()
        .map(|s| s.to_string())
        .collect()
}
