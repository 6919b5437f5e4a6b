//! CSV codec layered on the table's public surface.
//!
//! Reading parses each field through [`CellValue::parse`]; writing emits
//! each cell's `Display` form. Framing (delimiters, quotes) is delegated
//! to the `csv` crate.

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, TableError};
use crate::table::Table;
use crate::value::CellValue;

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Options for reading delimited text.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether the input has a header row.
    pub has_header: bool,
    /// Maximum data rows to read (None = all).
    pub max_rows: Option<usize>,
    /// Quote character.
    pub quote: u8,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
            quote: b'"',
        }
    }
}

/// Reads a delimited file into a new table.
pub fn read_path(path: impl AsRef<Path>, options: &ReadOptions) -> Result<Table> {
    let mut table = Table::empty();
    read_into(&mut table, path, options)?;
    Ok(table)
}

/// Reads a delimited file, appending to an existing table.
///
/// An empty table adopts the file's columns. Otherwise the file's header
/// must match the table's columns exactly, in order.
pub fn read_into(
    table: &mut Table,
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<()> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|e| TableError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let delimiter = match options.delimiter {
        Some(d) => d,
        None => detect_delimiter(&contents)?,
    };
    let parsed = parse_bytes(&contents, delimiter, options)?;
    table.append_table(&parsed)
}

/// Parses delimited bytes into a table.
fn parse_bytes(bytes: &[u8], delimiter: u8, options: &ReadOptions) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.has_header)
        .quote(options.quote)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = if options.has_header {
        reader.headers()?.iter().map(|s| s.to_string()).collect()
    } else {
        match reader.records().next() {
            Some(Ok(record)) => (0..record.len())
                .map(|i| format!("column_{}", i + 1))
                .collect(),
            Some(Err(e)) => return Err(e.into()),
            None => return Err(TableError::EmptyData("no data rows found".to_string())),
        }
    };
    if headers.is_empty() {
        return Err(TableError::EmptyData("no columns found".to_string()));
    }

    let mut table = Table::new(headers, Vec::new())?;

    // Re-create the reader: generating headers may have consumed it.
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(options.has_header)
        .quote(options.quote)
        .flexible(true)
        .from_reader(bytes);

    for (row_idx, result) in reader.records().enumerate() {
        if let Some(max) = options.max_rows {
            if row_idx >= max {
                break;
            }
        }
        let record = result?;
        let row: Vec<CellValue> = record.iter().map(CellValue::parse).collect();
        // append_row pads short records and drops excess fields.
        table.append_row(row);
    }

    Ok(table)
}

/// Writes the table as comma-delimited text to a file.
pub fn write_path(table: &Table, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = to_csv_string(table)?;
    fs::write(path, text).map_err(|e| TableError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Renders the table as comma-delimited text: a header line followed by
/// one line per row of cell string forms.
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Necessary)
        .from_writer(Vec::new());

    writer.write_record(table.column_names())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_string()))?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| TableError::EmptyData(format!("CSV writer flush failed: {e}")))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Detects the delimiter by scoring count consistency over the first few
/// lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .map_while(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(TableError::EmptyData("no lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts
                .iter()
                .map(|&c| (c as f64 - mean).powi(2))
                .sum::<f64>()
                / counts.len() as f64
        } else {
            0.0
        };

        // Higher count with lower variance wins; tab gets a slight bonus
        // since it rarely appears inside actual data.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Counts delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}
