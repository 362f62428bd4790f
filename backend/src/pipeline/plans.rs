//! The two fixed call sites of the pipeline. They differ in date bounds,
//! dedup key and step order, and are kept apart for that reason.

use super::{DateFilter, PipelineError, QueryPlan, DATE_FORMAT};
use chrono::{NaiveDate, NaiveDateTime};
use common::model::query::{DedupKey, FilterSpec, SortKey, SortSpec, StepOrder};
use common::requests::ViewQuery;

pub const CLOSING_DATE: &str = "CLOSING DATE";
pub const CLEAR_EXPIRED_ACTION: &str = "clear_repetitions_expired";
pub const DEFAULT_VIEW_SORT: &str = "RMS,PIN,NAME";

/// Plan for `GET /api/records/view`.
///
/// The `clear_repetitions_expired` action drops rows whose closing date is
/// already behind `now` and whole-row duplicates; otherwise
/// `dedup=all|contact` picks a key.
pub fn view_plan(query: &ViewQuery, now: NaiveDateTime) -> Result<QueryPlan, PipelineError> {
    let clear_expired = query.action.as_deref() == Some(CLEAR_EXPIRED_ACTION);

    let mut filters = FilterSpec::new();
    for (column, pattern) in [
        ("NAME", &query.name_filter),
        ("RMS", &query.rms_filter),
        ("PIN", &query.pin_filter),
    ] {
        if let Some(pattern) = pattern {
            filters.insert(column, pattern.as_str());
        }
    }
    for (column, pattern) in query.column_filters() {
        filters.insert(column, pattern);
    }

    let dedup = if clear_expired {
        Some(DedupKey::AllColumns)
    } else {
        match query.dedup.as_deref().map(str::trim) {
            None | Some("") | Some("none") => None,
            Some("all") => Some(DedupKey::AllColumns),
            Some("contact") => Some(DedupKey::contact()),
            Some(other) => return Err(PipelineError::UnknownDedup(other.to_string())),
        }
    };

    Ok(QueryPlan {
        date_filter: clear_expired.then(|| DateFilter::not_before(CLOSING_DATE, now)),
        filters,
        sort: SortSpec::parse(query.sort.as_deref().unwrap_or(DEFAULT_VIEW_SORT)),
        dedup,
        order: StepOrder::SortThenDedup,
    })
}

/// Plan for the expired-customers workbook: closing dates within a month of
/// `today`'s month, one row per contact, ordered by closing date.
pub fn expired_export_plan(today: NaiveDate) -> QueryPlan {
    QueryPlan {
        date_filter: Some(DateFilter::month_window(CLOSING_DATE, today)),
        filters: FilterSpec::new(),
        sort: SortSpec::new(vec![
            SortKey::date(CLOSING_DATE, DATE_FORMAT),
            SortKey::asc("INTRODUCER VEDAVAHINI"),
            SortKey::asc("NAME"),
        ]),
        dedup: Some(DedupKey::contact()),
        order: StepOrder::DedupThenSort,
    }
}
