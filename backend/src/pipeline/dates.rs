//! Date-bounded filtering on a textual date column.
//!
//! Closing dates are stored as `dd-mm-YYYY` text. The filter parses them,
//! drops rows outside the bounds and writes the survivors back in the same
//! layout, so `1-2-2024` comes out as `01-02-2024`.

use super::PipelineError;
use chrono::{Datelike, Days, Months, NaiveDate, NaiveDateTime, NaiveTime};
use common::model::Dataset;
use regex::Regex;

pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Exact text accepted for [`DATE_FORMAT`]. chrono alone also takes
/// `01-03-24` (year 24) and `01-02-+2024`.
const DATE_SHAPE: &str = r"^[0-9]{1,2}-[0-9]{1,2}-[0-9]{4}$";

/// Inclusive date bounds applied to one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    pub column: String,
    pub format: String,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateFilter {
    /// Keeps rows whose date, taken at midnight, is not earlier than `now`.
    ///
    /// Rows closing today are therefore dropped unless `now` is exactly
    /// midnight.
    pub fn not_before(column: impl Into<String>, now: NaiveDateTime) -> Self {
        let today = now.date();
        let start = if now.time() == NaiveTime::MIN {
            today
        } else {
            today.succ_opt().unwrap_or(today)
        };
        Self {
            column: column.into(),
            format: DATE_FORMAT.to_string(),
            start: Some(start),
            end: None,
        }
    }

    /// Keeps rows from the first day of the previous month to the last day
    /// of the next month.
    pub fn month_window(column: impl Into<String>, today: NaiveDate) -> Self {
        let (start, end) = month_window(today);
        Self {
            column: column.into(),
            format: DATE_FORMAT.to_string(),
            start,
            end,
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}

/// `[first day of previous month, last day of next month]` around `today`.
///
/// A bound that falls outside chrono's range is left open.
pub fn month_window(today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let month_start = today - Days::new(u64::from(today.day0()));
    let start = month_start.checked_sub_months(Months::new(1));
    let end = month_start
        .checked_add_months(Months::new(2))
        .and_then(|d| d.pred_opt());
    (start, end)
}

/// Reads one column's dates. For [`DATE_FORMAT`] the whole value must match
/// [`DATE_SHAPE`] before chrono sees it.
struct DateParser<'f> {
    format: &'f str,
    shape: Option<Regex>,
}

impl<'f> DateParser<'f> {
    fn new(format: &'f str) -> Result<Self, PipelineError> {
        let shape = if format == DATE_FORMAT {
            Some(Regex::new(DATE_SHAPE).map_err(|e| PipelineError::DatePattern(e.to_string()))?)
        } else {
            None
        };
        Ok(Self { format, shape })
    }

    fn parse(&self, raw: &str) -> Option<NaiveDate> {
        if self.shape.as_ref().is_some_and(|re| !re.is_match(raw)) {
            return None;
        }
        NaiveDate::parse_from_str(raw, self.format).ok()
    }
}

/// Applies `filter` in place and returns how many rows were dropped.
///
/// Null and blank dates never satisfy a bound and are dropped. Any other
/// value must be a date in the filter's format, padding included, or the
/// whole call fails.
pub(super) fn apply(data: &mut Dataset, filter: &DateFilter) -> Result<usize, PipelineError> {
    let idx = data.require_column(&filter.column)?;
    let parser = DateParser::new(&filter.format)?;

    let mut kept = Vec::with_capacity(data.len());
    for (i, record) in data.records().iter().enumerate() {
        let raw = match record.cell(idx) {
            Some(raw) if !raw.trim().is_empty() => raw,
            _ => continue,
        };
        let date = parser.parse(raw).ok_or_else(|| PipelineError::DateParse {
            row: i + 1,
            column: filter.column.clone(),
            value: raw.to_string(),
            format: filter.format.clone(),
        })?;
        if filter.contains(date) {
            let mut record = record.clone();
            record.set_cell(idx, Some(date.format(&filter.format).to_string()));
            kept.push(record);
        }
    }

    let removed = data.len() - kept.len();
    *data = data.derive(kept);
    Ok(removed)
}
