//! CSV spreadsheet access shared by the catalog and the regimen store.
//!
//! Columns are located by header name (case-insensitive), so files with
//! reordered or missing optional columns still load. Only headers are
//! trimmed; cell text comes back exactly as written. Writes replace the whole
//! file through `atomic::replace_file`.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::atomic;
use crate::error::{MedError, Result};

/// A parsed sheet: one `Vec` per data row, cells ordered like the requested columns.
/// Cells for columns absent from the file are `None`.
pub(crate) type Rows = Vec<Vec<Option<String>>>;

/// Read `path`, returning `Ok(None)` when the file does not exist.
pub(crate) fn read(path: &Path, columns: &[&str], required: &[&str]) -> Result<Option<Rows>> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "sheet not found, starting empty");
            return Ok(None);
        }
        Err(e) => return Err(MedError::storage(path, e)),
    };
    let rows = parse(file, columns, required).map_err(|e| match e {
        ParseError::Csv(e) => MedError::storage(path, e),
        ParseError::MissingColumn(name) => MedError::storage(
            path,
            format!("missing required column '{name}'"),
        ),
    })?;
    tracing::debug!(path = %path.display(), rows = rows.len(), "sheet loaded");
    Ok(Some(rows))
}

#[derive(Debug)]
pub(crate) enum ParseError {
    Csv(csv::Error),
    MissingColumn(String),
}

pub(crate) fn parse<R: Read>(
    reader: R,
    columns: &[&str],
    required: &[&str],
) -> std::result::Result<Rows, ParseError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = rdr.headers().map_err(ParseError::Csv)?.clone();
    let col = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    for &name in required {
        if col(name).is_none() {
            return Err(ParseError::MissingColumn(name.to_string()));
        }
    }
    let indices: Vec<Option<usize>> = columns.iter().map(|&name| col(name)).collect();

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(ParseError::Csv)?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = indices
            .iter()
            .map(|idx| idx.and_then(|i| record.get(i)).map(str::to_string))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

/// Rewrite `path` in full with `header` and `rows`.
pub(crate) fn write<'a, I, R>(path: &Path, header: &[&str], rows: I) -> Result<()>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = &'a str>,
{
    let mut count = 0;
    atomic::replace_file(path, |file| {
        let mut wtr = csv::Writer::from_writer(file);
        wtr.write_record(header)?;
        for row in rows {
            wtr.write_record(row)?;
            count += 1;
        }
        wtr.flush()
    })?;
    tracing::debug!(path = %path.display(), rows = count, "sheet rewritten");
    Ok(())
}
