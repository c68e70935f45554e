/// Bulk transfer between spreadsheets and instrument records
///
/// Lossy, best-effort conversion in both directions:
///
/// - [`import`]: first sheet of an uploaded workbook → instruments to insert,
///   tolerating missing or capitalized column names
/// - [`export`]: all instruments → single-sheet xlsx file
///
/// Both directions are synchronous; callers on the async runtime should run
/// them inside `spawn_blocking`.

pub mod export;
pub mod import;

pub use export::{write_workbook, EXPORT_HEADERS, EXPORT_SHEET_NAME};
pub use import::{parse_instruments, ImportPlan};

/// Error type for spreadsheet conversion
#[derive(Debug, thiserror::Error)]
pub enum BulkError {
    /// The upload isn't a readable spreadsheet
    #[error("Failed to parse spreadsheet: {0}")]
    Parse(#[from] calamine::Error),

    /// The workbook has no sheets
    #[error("Spreadsheet has no sheets")]
    NoSheets,

    /// Building or saving the export workbook failed
    #[error("Failed to write spreadsheet: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}
