use super::{Step, StepReport};
use common::model::Dataset;

/// Case-insensitive literal substring match. Null never matches.
pub(crate) fn matches(value: Option<&str>, pattern_lower: &str) -> bool {
    value.is_some_and(|v| v.to_lowercase().contains(pattern_lower))
}

/// Keeps the records whose `column` contains `pattern`.
///
/// An unknown column leaves the dataset untouched: the filter probably
/// belongs to a file uploaded earlier in the session.
pub(super) fn apply(data: &mut Dataset, column: &str, pattern: &str) -> StepReport {
    let step = Step::Filter(column.to_string());
    let Some(idx) = data.column_index(column) else {
        return StepReport::skipped(step, format!("unknown column '{column}'"));
    };

    let pattern = pattern.to_lowercase();
    let before = data.len();
    data.retain(|r| matches(r.cell(idx), &pattern));
    StepReport::applied(step, before - data.len())
}
