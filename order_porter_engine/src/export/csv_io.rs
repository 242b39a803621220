use std::{
    collections::{BTreeMap, BTreeSet},
    fs::File,
    io,
    path::Path,
};

use log::*;
use vivid_tools::OrderRecord;

use crate::export::ExportError;

/// The lexicographically sorted union of every field name in the batch.
pub fn csv_header(records: &[OrderRecord]) -> Vec<String> {
    records
        .iter()
        .flat_map(|r| r.field_names())
        .collect::<BTreeSet<&str>>()
        .into_iter()
        .map(String::from)
        .collect()
}

/// Writes one row per record. Fields a record does not have become empty cells. Returns the number of rows written.
/// An empty batch writes nothing at all, not even a header.
pub fn write_csv<W: io::Write>(writer: W, records: &[OrderRecord]) -> Result<usize, ExportError> {
    if records.is_empty() {
        return Ok(0);
    }
    let header = csv_header(records);
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(&header)?;
    for record in records {
        writer.write_record(header.iter().map(|name| record.get(name).unwrap_or_default()))?;
    }
    writer.flush().map_err(|e| ExportError::CsvError(e.to_string()))?;
    Ok(records.len())
}

pub fn write_csv_file<P: AsRef<Path>>(path: P, records: &[OrderRecord]) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| ExportError::write(path, e))?;
    let rows = write_csv(file, records).map_err(|e| ExportError::write(path, e))?;
    debug!("📤️ Wrote {rows} rows to {}", path.display());
    Ok(rows)
}

/// Reads a headed CSV table into one map per row. Cells are kept as-is, including blanks; short rows are tolerated.
pub fn read_csv<R: io::Read>(reader: R) -> Result<Vec<BTreeMap<String, String>>, ExportError> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let header = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = header
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<BTreeMap<String, String>>();
        rows.push(row);
    }
    Ok(rows)
}

pub fn read_csv_file<P: AsRef<Path>>(path: P) -> Result<Vec<BTreeMap<String, String>>, ExportError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| ExportError::read(path, e))?;
    let rows = read_csv(file).map_err(|e| ExportError::read(path, e))?;
    trace!("📤️ Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}
