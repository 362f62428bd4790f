use super::{Step, StepReport};
use chrono::NaiveDate;
use common::model::query::{SortKind, SortSpec};
use common::model::{Dataset, Record};
use std::cmp::Ordering;

/// Sort value of one cell. The derived order puts numbers before text;
/// `None` (null or unparseable) is handled by the caller and always sorts last.
#[derive(Debug, PartialEq, PartialOrd)]
enum Key<'a> {
    Number(f64),
    Date(NaiveDate),
    Text(&'a str),
}

fn key<'a>(value: Option<&'a str>, kind: &SortKind) -> Option<Key<'a>> {
    let value = value?;
    match kind {
        SortKind::Natural => match value.trim().parse::<f64>() {
            Ok(n) if n.is_finite() => Some(Key::Number(n)),
            _ => Some(Key::Text(value)),
        },
        SortKind::Date(format) => NaiveDate::parse_from_str(value.trim(), format)
            .ok()
            .map(Key::Date),
    }
}

fn compare_keys(a: &Key<'_>, b: &Key<'_>) -> Ordering {
    match (a, b) {
        (Key::Number(x), Key::Number(y)) => x.total_cmp(y),
        _ => a.partial_cmp(b).unwrap_or(Ordering::Equal),
    }
}

struct ResolvedKey<'s> {
    idx: usize,
    ascending: bool,
    kind: &'s SortKind,
}

fn compare_records(a: &Record, b: &Record, keys: &[ResolvedKey<'_>]) -> Ordering {
    for k in keys {
        let ord = match (key(a.cell(k.idx), k.kind), key(b.cell(k.idx), k.kind)) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Greater,
            (Some(_), None) => Ordering::Less,
            (Some(x), Some(y)) => {
                let ord = compare_keys(&x, &y);
                if k.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            }
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

/// Stable multi-key sort. Skipped entirely when any key column is absent.
pub(super) fn apply(data: &mut Dataset, spec: &SortSpec) -> StepReport {
    let mut keys = Vec::with_capacity(spec.keys().len());
    for k in spec.keys() {
        match data.column_index(&k.column) {
            Some(idx) => keys.push(ResolvedKey {
                idx,
                ascending: k.ascending,
                kind: &k.kind,
            }),
            None => {
                return StepReport::skipped(
                    Step::Sort,
                    format!("unknown column '{}'", k.column),
                )
            }
        }
    }

    data.sort_by(|a, b| compare_records(a, b, &keys));
    StepReport::applied(Step::Sort, 0)
}
