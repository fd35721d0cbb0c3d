use crate::error::Result;
use crate::schema::{CellValue, RawTable};
use csv::{ReaderBuilder, Trim};
use log::debug;
use std::io::Read;
use std::path::Path;

/// Reads CSV with a header row into a [`RawTable`].
///
/// Ragged rows are accepted; blank cells become [`CellValue::Empty`] and
/// everything else is kept as text for the coercion step.
pub fn read_csv<R: Read>(reader: R) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        rows.push(record.iter().map(CellValue::from_raw).collect());
    }

    debug!("Read CSV with {} columns and {} rows", headers.len(), rows.len());

    Ok(RawTable::new(headers, rows))
}

pub fn read_csv_file(path: impl AsRef<Path>) -> Result<RawTable> {
    let file = std::fs::File::open(path)?;
    read_csv(file)
}
