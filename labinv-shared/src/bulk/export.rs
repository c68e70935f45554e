/// Spreadsheet export
///
/// Writes every instrument into a single sheet whose header row is the
/// record's field names.

use rust_xlsxwriter::Workbook;
use std::path::Path;

use super::BulkError;
use crate::models::instrument::Instrument;

/// Name of the exported sheet
pub const EXPORT_SHEET_NAME: &str = "instrumentos";

/// Header row of the exported sheet
pub const EXPORT_HEADERS: [&str; 5] = ["id", "nombre", "categoria", "estado", "ubicacion"];

/// Builds the export workbook in memory
pub fn build_workbook(instruments: &[Instrument]) -> Result<Workbook, BulkError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet.write_string(0, col as u16, *header)?;
    }

    for (index, instrument) in instruments.iter().enumerate() {
        let row = index as u32 + 1;
        worksheet.write_number(row, 0, instrument.id)?;
        worksheet.write_string(row, 1, instrument.nombre.as_str())?;
        worksheet.write_string(row, 2, instrument.categoria.as_str())?;
        worksheet.write_string(row, 3, instrument.estado.as_str())?;
        worksheet.write_string(row, 4, instrument.ubicacion.as_str())?;
    }

    Ok(workbook)
}

/// Builds the export workbook and saves it to `path`
pub fn write_workbook(instruments: &[Instrument], path: &Path) -> Result<(), BulkError> {
    let mut workbook = build_workbook(instruments)?;
    workbook.save(path)?;
    Ok(())
}
