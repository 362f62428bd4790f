//! # Query Pipeline
//!
//! Turns the session's original dataset into a *view* by running, in order:
//!
//! 1.  an optional date filter (`dates`), which also normalizes the date column;
//! 2.  the case-insensitive substring filters (`filter`);
//! 3.  sorting (`sort`) and deduplication (`dedup`), in the order given by
//!     [`StepOrder`] because the view and the export disagree on it.
//!
//! `apply` is a pure function of `(dataset, plan)`: it clones the original and
//! never touches the session store. Conditions the pipeline can recover from
//! (an unknown filter column, a missing sort column) are reported as
//! [`StepOutcome::Skipped`]; the rest (a missing date or dedup column, an
//! unparseable date) abort the whole query with a [`PipelineError`].

pub mod dates;
mod dedup;
mod filter;
pub mod plans;
mod sort;

use common::model::query::{DedupKey, FilterSpec, SortSpec, StepOrder};
use common::model::{Dataset, MissingField};
use common::responses::StepSummary;
use std::fmt;
use thiserror::Error;

pub use dates::{DateFilter, DATE_FORMAT};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineError {
    #[error(transparent)]
    MissingField(#[from] MissingField),
    #[error("row {row}: cannot read '{value}' in column '{column}' as a date ({format})")]
    DateParse {
        row: usize,
        column: String,
        value: String,
        format: String,
    },
    #[error("invalid date pattern: {0}")]
    DatePattern(String),
    #[error("unknown dedup mode '{0}' (expected 'all', 'contact' or 'none')")]
    UnknownDedup(String),
}

/// Everything one query asks of the pipeline.
#[derive(Debug, Clone, Default)]
pub struct QueryPlan {
    pub date_filter: Option<DateFilter>,
    pub filters: FilterSpec,
    pub sort: SortSpec,
    pub dedup: Option<DedupKey>,
    pub order: StepOrder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    DateFilter(String),
    Filter(String),
    Sort,
    Dedup,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::DateFilter(col) => write!(f, "date_filter({col})"),
            Step::Filter(col) => write!(f, "filter({col})"),
            Step::Sort => f.write_str("sort"),
            Step::Dedup => f.write_str("dedup"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Applied { removed: usize },
    Skipped(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepReport {
    pub step: Step,
    pub outcome: StepOutcome,
}

impl StepReport {
    fn applied(step: Step, removed: usize) -> Self {
        Self {
            step,
            outcome: StepOutcome::Applied { removed },
        }
    }

    fn skipped(step: Step, reason: impl Into<String>) -> Self {
        Self {
            step,
            outcome: StepOutcome::Skipped(reason.into()),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self.outcome, StepOutcome::Applied { .. })
    }
}

impl From<&StepReport> for StepSummary {
    fn from(report: &StepReport) -> Self {
        let (applied, detail) = match &report.outcome {
            StepOutcome::Applied { removed } => (true, format!("{removed} rows removed")),
            StepOutcome::Skipped(reason) => (false, reason.clone()),
        };
        StepSummary {
            step: report.step.to_string(),
            applied,
            detail,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct View {
    pub dataset: Dataset,
    pub report: Vec<StepReport>,
}

impl View {
    pub fn summaries(&self) -> Vec<StepSummary> {
        self.report.iter().map(StepSummary::from).collect()
    }
}

pub fn apply(original: &Dataset, plan: &QueryPlan) -> Result<View, PipelineError> {
    let mut data = original.clone();
    let mut report = Vec::new();

    if let Some(date_filter) = &plan.date_filter {
        let removed = dates::apply(&mut data, date_filter)?;
        report.push(StepReport::applied(
            Step::DateFilter(date_filter.column.clone()),
            removed,
        ));
    }

    for (column, pattern) in plan.filters.active() {
        report.push(filter::apply(&mut data, column, pattern));
    }

    match plan.order {
        StepOrder::SortThenDedup => {
            push_sort(&mut data, &plan.sort, &mut report);
            push_dedup(&mut data, plan.dedup.as_ref(), &mut report)?;
        }
        StepOrder::DedupThenSort => {
            push_dedup(&mut data, plan.dedup.as_ref(), &mut report)?;
            push_sort(&mut data, &plan.sort, &mut report);
        }
    }

    for entry in &report {
        log::debug!("pipeline step {}: {:?}", entry.step, entry.outcome);
    }

    Ok(View {
        dataset: data,
        report,
    })
}

fn push_sort(data: &mut Dataset, spec: &SortSpec, report: &mut Vec<StepReport>) {
    if !spec.is_empty() {
        report.push(sort::apply(data, spec));
    }
}

fn push_dedup(
    data: &mut Dataset,
    key: Option<&DedupKey>,
    report: &mut Vec<StepReport>,
) -> Result<(), PipelineError> {
    if let Some(key) = key {
        let removed = dedup::apply(data, key)?;
        report.push(StepReport::applied(Step::Dedup, removed));
    }
    Ok(())
}
