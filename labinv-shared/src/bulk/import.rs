/// Spreadsheet import
///
/// The first row of the first sheet is the header row. Every later row is
/// turned into a header → text mapping (empty cells are left out), then
/// resolved into a [`CreateInstrument`]:
///
/// - each field is looked up as `nombre`, then `Nombre` (same for the
///   other three); an empty value counts as missing
/// - `estado` defaults to `DISPONIBLE`, `ubicacion` to `""`
/// - rows without `nombre` or `categoria` are skipped

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::collections::HashMap;
use std::io::Cursor;

use super::BulkError;
use crate::models::instrument::{CreateInstrument, DEFAULT_ESTADO, DEFAULT_UBICACION};

/// One data row keyed by header text
pub type SheetRow = HashMap<String, String>;

/// Result of parsing an upload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// Rows that resolved to an instrument, in sheet order
    pub instruments: Vec<CreateInstrument>,

    /// Rows dropped for lacking `nombre` or `categoria`
    pub skipped: usize,
}

/// Parses an uploaded workbook into instruments to insert
///
/// The format (xlsx, xlsm, xlsb, xls, ods) is detected from the content.
///
/// # Errors
///
/// Returns `BulkError::Parse` if the bytes aren't a spreadsheet and
/// `BulkError::NoSheets` if the workbook is empty.
pub fn parse_instruments(bytes: Vec<u8>) -> Result<ImportPlan, BulkError> {
    let rows = read_first_sheet(bytes)?;

    let mut plan = ImportPlan::default();
    for row in &rows {
        match resolve_row(row) {
            Some(instrument) => plan.instruments.push(instrument),
            None => plan.skipped += 1,
        }
    }

    Ok(plan)
}

/// Reads the first sheet as header-keyed rows
pub fn read_first_sheet(bytes: Vec<u8>) -> Result<Vec<SheetRow>, BulkError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook.worksheet_range_at(0).ok_or(BulkError::NoSheets)??;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Vec::new());
    };
    let headers: Vec<Option<String>> = header_row.iter().map(cell_text).collect();

    let sheet_rows = rows
        .map(|cells| {
            let mut row = SheetRow::new();
            for (header, cell) in headers.iter().zip(cells) {
                if let (Some(header), Some(value)) = (header, cell_text(cell)) {
                    row.entry(header.clone()).or_insert(value);
                }
            }
            row
        })
        .filter(|row| !row.is_empty())
        .collect();

    Ok(sheet_rows)
}

/// Resolves a row into an instrument, or `None` if it must be skipped
pub fn resolve_row(row: &SheetRow) -> Option<CreateInstrument> {
    let nombre = lookup(row, "nombre")?;
    let categoria = lookup(row, "categoria")?;

    Some(CreateInstrument {
        nombre,
        categoria,
        estado: Some(lookup(row, "estado").unwrap_or_else(|| DEFAULT_ESTADO.to_string())),
        ubicacion: Some(lookup(row, "ubicacion").unwrap_or_else(|| DEFAULT_UBICACION.to_string())),
    })
}

/// Looks up `key`, then its capitalized form
fn lookup(row: &SheetRow, key: &str) -> Option<String> {
    let present = |k: &str| row.get(k).filter(|v| !v.is_empty()).cloned();
    present(key).or_else(|| present(&capitalize(key)))
}

fn capitalize(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.is_empty() => None,
        Data::String(s) => Some(s.clone()),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => Some(format!("{}", *f as i64)),
        other => Some(other.to_string()),
    }
}
