use common::model::query::DedupKey;
use common::model::{Cell, Dataset, MissingField};
use std::collections::HashSet;

/// Drops records whose key repeats an earlier one, keeping the first
/// occurrence. Returns the number of records removed.
pub(super) fn apply(data: &mut Dataset, key: &DedupKey) -> Result<usize, MissingField> {
    let indices: Vec<usize> = match key {
        DedupKey::AllColumns => (0..data.columns().len()).collect(),
        DedupKey::Columns(columns) => columns
            .iter()
            .map(|c| data.require_column(c))
            .collect::<Result<_, _>>()?,
    };

    let before = data.len();
    let mut seen: HashSet<Vec<Cell>> = HashSet::with_capacity(before);
    data.retain(|r| {
        let k: Vec<Cell> = indices
            .iter()
            .map(|&i| r.cell(i).map(str::to_owned))
            .collect();
        seen.insert(k)
    });
    Ok(before - data.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::model::Record;
    use pretty_assertions::assert_eq;

    fn contacts() -> Dataset {
        Dataset::with_rows(
            ["NAME", "ADDRESS", "PHONE", "STATUS"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            vec![
                Record::from_texts(["Ravi", "1 Main", "111", "active"]),
                Record::from_texts(["Ravi", "1 Main", "111", "expired"]),
                Record::from_texts(["Ravi", "1 Main", "111", "active"]),
                Record::from_texts(["Asha", "2 Hill", "", "active"]),
                Record::from_texts(["Asha", "2 Hill", "", "active"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn full_row_policy() {
        let mut ds = contacts();
        assert_eq!(apply(&mut ds, &DedupKey::AllColumns).unwrap(), 2);
        assert_eq!(ds.len(), 3);
        assert_eq!(ds.row(1).unwrap().text("STATUS").unwrap(), "expired");
    }

    #[test]
    fn contact_policy_keeps_first() {
        let mut ds = contacts();
        assert_eq!(apply(&mut ds, &DedupKey::contact()).unwrap(), 3);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.row(0).unwrap().text("STATUS").unwrap(), "active");
    }

    #[test]
    fn idempotent() {
        for key in [DedupKey::AllColumns, DedupKey::contact()] {
            let mut once = contacts();
            apply(&mut once, &key).unwrap();
            let mut twice = once.clone();
            assert_eq!(apply(&mut twice, &key).unwrap(), 0);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn missing_key_column_is_fatal() {
        let mut ds = contacts();
        let err = apply(&mut ds, &DedupKey::Columns(vec!["EMAIL".into()])).unwrap_err();
        assert_eq!(err, MissingField::new("EMAIL"));
    }
}
