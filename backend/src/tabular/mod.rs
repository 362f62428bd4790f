//! Spreadsheet I/O: reading uploads into a [`Dataset`], the flat CSV format
//! used by the session store, and the XLSX export.
//!
//! [`Dataset`]: common::model::Dataset

pub mod export;
pub mod flat;
pub mod ingest;

use common::model::{DatasetError, MissingField};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("unsupported file type '{0}' (expected .xlsx, .xlsm, .xls, .ods or .csv)")]
    UnsupportedFile(String),
    #[error("malformed spreadsheet: {0}")]
    Malformed(String),
    #[error("malformed spreadsheet: {0}")]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error("could not read workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not write workbook: {0}")]
    Export(#[from] rust_xlsxwriter::XlsxError),
}
