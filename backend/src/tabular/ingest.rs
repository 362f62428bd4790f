//! Upload parsing.
//!
//! Workbooks are read with calamine (first worksheet, first row is the
//! header); CSV files go through [`super::flat::read_csv`] with a sniffed
//! delimiter. Either way the result is an all-text [`Dataset`].

use super::flat::read_csv_with;
use super::TabularError;
use crate::pipeline::DATE_FORMAT;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use common::model::{Cell, Dataset, Record};
use regex::Regex;
use std::io::Cursor;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Workbook,
    Csv,
}

impl SourceFormat {
    /// Picks the reader from the upload's file extension.
    pub fn from_filename(filename: &str) -> Result<Self, TabularError> {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xls" | "ods" => Ok(SourceFormat::Workbook),
            "csv" => Ok(SourceFormat::Csv),
            _ => Err(TabularError::UnsupportedFile(filename.to_string())),
        }
    }
}

/// Parses an uploaded file into a dataset.
pub fn read(format: SourceFormat, bytes: Vec<u8>) -> Result<Dataset, TabularError> {
    let header_re = Regex::new(r"\s+").map_err(|e| TabularError::Malformed(e.to_string()))?;
    match format {
        SourceFormat::Workbook => read_workbook(bytes, &header_re),
        SourceFormat::Csv => read_delimited(&bytes, &header_re),
    }
}

fn read_workbook(bytes: Vec<u8>, header_re: &Regex) -> Result<Dataset, TabularError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| TabularError::Malformed("workbook has no worksheets".into()))??;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| TabularError::Malformed("missing header row".into()))?;
    let columns = normalize_header(
        header.iter().map(|c| cell_text(c).unwrap_or_default()),
        header_re,
    )?;

    let mut dataset = Dataset::new(columns)?;
    for row in rows {
        let cells: Vec<Cell> = row.iter().map(cell_text).collect();
        if cells.iter().all(Option::is_none) {
            continue;
        }
        dataset.push(Record::new(cells))?;
    }
    Ok(dataset)
}

fn read_delimited(bytes: &[u8], header_re: &Regex) -> Result<Dataset, TabularError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let first_line = bytes.split(|&b| b == b'\n').next().unwrap_or_default();
    read_csv_with(bytes, sniff_delimiter(first_line), |raw| {
        normalize_header(raw.iter().map(str::to_string), header_re)
    })
}

/// The most frequent of `,` `;` tab and `|` in the header line; comma on a tie.
fn sniff_delimiter(header: &[u8]) -> u8 {
    let mut best = (b',', header.iter().filter(|&&b| b == b',').count());
    for candidate in [b';', b'\t', b'|'] {
        let count = header.iter().filter(|&&b| b == candidate).count();
        if count > best.1 {
            best = (candidate, count);
        }
    }
    best.0
}

fn cell_text(cell: &Data) -> Cell {
    let text = match cell {
        Data::Empty => return None,
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_number(*f),
        Data::Bool(b) => b.to_string().to_uppercase(),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(d) => d.format(DATE_FORMAT).to_string(),
            None => format_number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => e.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

/// Integral values print without a fractional part, so PIN 673009 stays
/// `673009` and not `673009.0`.
fn format_number(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

/// Trims header cells and collapses inner whitespace. Empty names are
/// rejected here, repeated ones by [`Dataset::new`].
fn normalize_header<I>(raw: I, whitespace: &Regex) -> Result<Vec<String>, TabularError>
where
    I: IntoIterator<Item = String>,
{
    raw.into_iter()
        .enumerate()
        .map(|(i, column)| {
            let name = whitespace.replace_all(column.trim(), " ").into_owned();
            if name.is_empty() {
                Err(TabularError::Malformed(format!("header cell {} is empty", i + 1)))
            } else {
                Ok(name)
            }
        })
        .collect()
}
