use super::TabularError;
use common::model::{Dataset, Record};
use std::io::{Read, Write};

/// Reads a delimited file whose first record is the header.
///
/// Empty fields become null cells. Records with a different number of fields
/// than the header are rejected by the csv reader.
pub fn read_csv<R: Read>(reader: R, delimiter: u8) -> Result<Dataset, TabularError> {
    read_csv_with(reader, delimiter, |header| {
        Ok(header.iter().map(str::to_string).collect())
    })
}

/// Like [`read_csv`], with `columns` turning the raw header into column names.
pub fn read_csv_with<R, F>(reader: R, delimiter: u8, columns: F) -> Result<Dataset, TabularError>
where
    R: Read,
    F: FnOnce(&csv::StringRecord) -> Result<Vec<String>, TabularError>,
{
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .from_reader(reader);

    let columns = columns(reader.headers()?)?;
    let mut dataset = Dataset::new(columns)?;
    for record in reader.records() {
        dataset.push(Record::from_texts(record?.iter()))?;
    }
    Ok(dataset)
}

/// Writes `dataset` as comma-separated text with a header row.
pub fn write_csv<W: Write>(dataset: &Dataset, writer: W) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(dataset.columns())?;
    for record in dataset.records() {
        writer.write_record(record.cells().iter().map(|c| c.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn round_trip_preserves_nulls_and_quoting() {
        let ds = Dataset::with_rows(
            vec!["NAME".into(), "ADDRESS".into(), "PHONE".into()],
            vec![
                Record::from_texts(["Ravi", "12/2375, \"C.N.\" Arcade", ""]),
                Record::from_texts(["Asha", "Line one\nLine two", "0495"]),
            ],
        )
        .unwrap();

        let mut buf = Vec::new();
        write_csv(&ds, &mut buf).unwrap();
        let back = read_csv(buf.as_slice(), b',').unwrap();
        assert_eq!(back, ds);
    }

    #[test]
    fn ragged_input_is_an_error() {
        let input = "A,B\n1,2\n3\n";
        assert!(read_csv(input.as_bytes(), b',').is_err());
    }
}
