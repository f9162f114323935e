//! Reads a campaign CSV export into a [`Table`].

use csv::ReaderBuilder;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::errors::{ReportError, ReportResult};
use crate::models::{Cell, Table};

const UTF8_BOM: char = '\u{feff}';

/// Load the CSV at `path`. The caller has already checked that it exists.
pub fn load_table(path: &Path) -> ReportResult<Table> {
    let file = File::open(path).map_err(|e| ReportError::io(e, Some(path.to_path_buf())))?;
    let table = parse(file, path)?;
    log::info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Parse CSV from any reader. Errors are reported against `<reader>`.
pub fn load_table_from_reader<R: Read>(reader: R) -> ReportResult<Table> {
    parse(reader, Path::new("<reader>"))
}

fn parse<R: Read>(reader: R, source: &Path) -> ReportResult<Table> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ReportError::parse(e, source))?
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            if idx == 0 {
                name.trim_start_matches(UTF8_BOM).to_string()
            } else {
                name.to_string()
            }
        })
        .collect();
    let headers = dedupe_headers(headers);
    log::debug!("Header row: {:?}", headers);

    // Short records are padded with missing cells; long ones are left for
    // `Table::from_rows` to reject.
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ReportError::parse(e, source))?;
        let mut row: Vec<Cell> = record.iter().map(Cell::from_field).collect();
        if row.len() < headers.len() {
            row.resize(headers.len(), Cell::Missing);
        }
        rows.push(row);
    }

    Table::from_rows(headers, rows).map_err(|e| ReportError::table(e, source))
}

/// Rename repeated header names to `name.1`, `name.2`, ... in file order.
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(headers.len());
    let mut out = Vec::with_capacity(headers.len());
    for name in headers {
        let mut candidate = name.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{}.{}", name, suffix);
            suffix += 1;
        }
        if candidate != name {
            log::debug!("Renamed duplicate column '{}' to '{}'", name, candidate);
        }
        seen.insert(candidate.clone());
        out.push(candidate);
    }
    out
}
