use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single cell. `None` is a null/empty spreadsheet cell.
pub type Cell = Option<String>;

/// Raised when a required column is not part of the dataset.
///
/// Label rendering and date parsing treat this as fatal; filters and sorting
/// turn the same condition into a skipped step instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing field '{column}'")]
pub struct MissingField {
    pub column: String,
}

impl MissingField {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }
}

/// Structural problems found while assembling a [`Dataset`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatasetError {
    #[error("row {row} has {found} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),
    #[error(transparent)]
    MissingField(#[from] MissingField),
}

/// One row of a dataset. Cells are positionally aligned with
/// [`Dataset::columns`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Vec<Cell>);

impl Record {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self(cells)
    }

    /// Builds a record from text cells, mapping empty strings to null.
    pub fn from_texts<I, S>(cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            cells
                .into_iter()
                .map(|c| {
                    let c = c.into();
                    if c.is_empty() { None } else { Some(c) }
                })
                .collect(),
        )
    }

    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    pub fn cell(&self, idx: usize) -> Option<&str> {
        self.0.get(idx).and_then(|c| c.as_deref())
    }

    /// Replaces the cell at `idx`; out-of-range indices are ignored.
    pub fn set_cell(&mut self, idx: usize, value: Cell) {
        if let Some(cell) = self.0.get_mut(idx) {
            *cell = value;
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An ordered set of uniform-column records.
///
/// Columns come from the uploaded file's header row, so they are only known
/// at runtime. Every record has exactly one cell per column; the
/// constructors reject anything else.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    pub fn new(columns: Vec<String>) -> Result<Self, DatasetError> {
        for (i, name) in columns.iter().enumerate() {
            if columns[..i].contains(name) {
                return Err(DatasetError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn with_rows(columns: Vec<String>, rows: Vec<Record>) -> Result<Self, DatasetError> {
        let mut dataset = Self::new(columns)?;
        dataset.rows.reserve(rows.len());
        for row in rows {
            dataset.push(row)?;
        }
        Ok(dataset)
    }

    pub fn push(&mut self, record: Record) -> Result<(), DatasetError> {
        if record.len() != self.columns.len() {
            return Err(DatasetError::RaggedRow {
                row: self.rows.len() + 1,
                expected: self.columns.len(),
                found: record.len(),
            });
        }
        self.rows.push(record);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn records(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    /// Resolves a column to its index or reports it as a [`MissingField`].
    pub fn require_column(&self, column: &str) -> Result<usize, MissingField> {
        self.column_index(column)
            .ok_or_else(|| MissingField::new(column))
    }

    pub fn row(&self, idx: usize) -> Option<Row<'_>> {
        self.rows.get(idx).map(|record| Row {
            columns: &self.columns,
            record,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Row<'_>> {
        self.rows.iter().map(move |record| Row {
            columns: &self.columns,
            record,
        })
    }

    /// Returns a copy holding only `columns`, in the given order.
    pub fn project<S: AsRef<str>>(&self, columns: &[S]) -> Result<Dataset, MissingField> {
        let indices = columns
            .iter()
            .map(|c| self.require_column(c.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let rows = self
            .rows
            .iter()
            .map(|r| Record(indices.iter().map(|&i| r.0[i].clone()).collect()))
            .collect();
        Ok(Dataset {
            columns: columns.iter().map(|c| c.as_ref().to_string()).collect(),
            rows,
        })
    }

    /// Same columns, different rows. Rows are assumed to come from `self`.
    pub fn derive(&self, rows: Vec<Record>) -> Dataset {
        debug_assert!(rows.iter().all(|r| r.len() == self.columns.len()));
        Dataset {
            columns: self.columns.clone(),
            rows,
        }
    }

    pub fn retain<F>(&mut self, f: F)
    where
        F: FnMut(&Record) -> bool,
    {
        self.rows.retain(f);
    }

    /// Stable sort of the records.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&Record, &Record) -> std::cmp::Ordering,
    {
        self.rows.sort_by(compare);
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Record>) {
        (self.columns, self.rows)
    }
}

/// Borrowed view of one record with by-name access.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    columns: &'a [String],
    record: &'a Record,
}

impl<'a> Row<'a> {
    pub fn record(&self) -> &'a Record {
        self.record
    }

    /// Value of `column`; `Ok(None)` is a null cell, `Err` an absent column.
    pub fn get(&self, column: &str) -> Result<Option<&'a str>, MissingField> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| MissingField::new(column))?;
        Ok(self.record.cell(idx))
    }

    /// Like [`Row::get`] with null rendered as an empty string.
    pub fn text(&self, column: &str) -> Result<&'a str, MissingField> {
        self.get(column).map(|v| v.unwrap_or(""))
    }
}
