use super::TabularError;
use common::model::Dataset;
use rust_xlsxwriter::{Format, Workbook};

/// Columns of the expired-customers workbook, in sheet order.
pub const EXPIRED_COLUMNS: [&str; 14] = [
    "NAME",
    "ADDRESS",
    "LOCATION",
    "POST",
    "DISTRICT",
    "PHONE",
    "STATE",
    "FROM DATE",
    "DURATION(M)",
    "CLOSING DATE",
    "STATUS",
    "INTRODUCER NAME",
    "INTRODUCER VEDAVAHINI",
    "INTRODUCER PHONE NO.",
];

pub const EXPIRED_SHEET: &str = "Expired Customers";
pub const EXPIRED_FILENAME: &str = "expired_customers.xlsx";
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Projects `view` onto [`EXPIRED_COLUMNS`] and writes it as a workbook.
pub fn expired_customers(view: &Dataset) -> Result<Vec<u8>, TabularError> {
    let subset = view.project(&EXPIRED_COLUMNS)?;
    to_xlsx(&subset, EXPIRED_SHEET)
}

/// Writes `dataset` to a single-sheet workbook: bold header row, one row per
/// record, every cell as a string, null cells left blank.
pub fn to_xlsx(dataset: &Dataset, sheet: &str) -> Result<Vec<u8>, TabularError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet)?;

    for (col, name) in dataset.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, column_number(col)?, name, &header)?;
    }
    for (i, record) in dataset.records().iter().enumerate() {
        let row = u32::try_from(i + 1)
            .map_err(|_| TabularError::Malformed(format!("too many rows ({})", i + 1)))?;
        for (col, cell) in record.cells().iter().enumerate() {
            if let Some(value) = cell {
                worksheet.write_string(row, column_number(col)?, value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column_number(col: usize) -> Result<u16, TabularError> {
    u16::try_from(col).map_err(|_| TabularError::Malformed(format!("too many columns ({col})")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tabular::ingest::tests::ingest;
    use common::model::{MissingField, Record};
    use pretty_assertions::assert_eq;

    fn expired_row(name: &str, closing: &str) -> Record {
        Record::from_texts([
            name,
            "12/2375 C.N. Arcade",
            "Malaparamba",
            "Kozhikode",
            "Kozhikode",
            "0495 2961151",
            "Kerala",
            "01-01-2023",
            "12",
            closing,
            "",
            "Sreeja",
            "KKD-04",
            "9447000000",
        ])
    }

    fn expired_dataset() -> Dataset {
        let mut columns: Vec<String> = EXPIRED_COLUMNS.iter().map(|c| c.to_string()).collect();
        columns.push("PIN".to_string());
        let rows = vec![
            expired_row("Ravi", "15-01-2024"),
            expired_row("Asha", "20-02-2024"),
        ]
        .into_iter()
        .map(|r| {
            let mut cells = r.cells().to_vec();
            cells.push(Some("673009".to_string()));
            Record::new(cells)
        })
        .collect();
        Dataset::with_rows(columns, rows).unwrap()
    }

    #[test]
    fn export_reingests_to_the_same_subset() {
        let view = expired_dataset();
        let bytes = expired_customers(&view).unwrap();

        let back = ingest(EXPIRED_FILENAME, bytes).unwrap();
        assert_eq!(back, view.project(&EXPIRED_COLUMNS).unwrap());
        // STATUS was blank and stays null
        assert_eq!(back.row(0).unwrap().get("STATUS").unwrap(), None);
    }

    #[test]
    fn missing_export_column_is_fatal() {
        let view = Dataset::with_rows(
            vec!["NAME".to_string()],
            vec![Record::from_texts(["Ravi"])],
        )
        .unwrap();
        let err = expired_customers(&view).unwrap_err();
        assert!(matches!(
            err,
            TabularError::MissingField(ref m) if *m == MissingField::new("ADDRESS")
        ));
    }

    #[test]
    fn empty_dataset_writes_header_only() {
        let ds = Dataset::new(vec!["NAME".to_string(), "PIN".to_string()]).unwrap();
        let back = ingest("out.xlsx", to_xlsx(&ds, "Sheet1").unwrap()).unwrap();
        assert_eq!(back.columns(), &["NAME", "PIN"]);
        assert!(back.is_empty());
    }
}
