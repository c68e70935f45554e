/// Spreadsheet import and export endpoints
///
/// - `POST /api/instrumentos/upload` - multipart field `archivo` holding a
///   workbook; every valid row of its first sheet becomes an instrument
///   (ADMIN, ASISTENTE)
/// - `GET /api/instrumentos/download` - every instrument as
///   `instrumentos.xlsx` (any role)
///
/// Parsing and writing run on the blocking pool.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Envelope},
};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Extension, Json,
};
use labinv_shared::{
    auth::session::SessionUser,
    bulk::{parse_instruments, write_workbook, ImportPlan},
    models::instrument::Instrument,
};
use std::path::Path;
use uuid::Uuid;

/// Multipart field carrying the uploaded workbook
pub const UPLOAD_FIELD: &str = "archivo";

/// File name offered to the browser on download
pub const DOWNLOAD_FILE_NAME: &str = "instrumentos.xlsx";

/// MIME type of xlsx files
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Imports instruments from an uploaded spreadsheet
///
/// Rows without `nombre` or `categoria` are skipped. Rows are inserted one
/// by one; a failed insert is logged and the import carries on.
///
/// # Errors
///
/// `Error al procesar Excel` when the `archivo` field is missing or can't
/// be read, or the file isn't a spreadsheet.
pub async fn upload(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<Envelope>> {
    let mut multipart = multipart.map_err(|e| ApiError::ParseError(e.to_string()))?;
    let bytes = read_upload(&mut multipart).await?;

    let ImportPlan {
        instruments,
        skipped,
    } = tokio::task::spawn_blocking(move || parse_instruments(bytes))
        .await
        .map_err(|e| ApiError::ParseError(e.to_string()))?
        .map_err(|e| ApiError::ParseError(e.to_string()))?;

    let rows = instruments.len();
    let mut failed = 0usize;
    for instrument in instruments {
        let nombre = instrument.nombre.clone();
        if let Err(e) = state.store.create_instrument(instrument).await {
            failed += 1;
            tracing::warn!(nombre = %nombre, error = %e, "Skipping spreadsheet row that failed to insert");
        }
    }

    tracing::info!(
        correo = %user.correo,
        rows,
        skipped,
        failed,
        "Spreadsheet imported"
    );

    Ok(Json(Envelope::success()))
}

/// Returns the bytes of the `archivo` field
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Vec<u8>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::ParseError(e.to_string()))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::ParseError(e.to_string()))?;
            return Ok(bytes.to_vec());
        }
    }

    Err(ApiError::ParseError(format!(
        "multipart field '{}' is missing",
        UPLOAD_FIELD
    )))
}

/// Exports every instrument as an xlsx attachment
///
/// The workbook is written to a uniquely named file in the upload
/// directory, read back and removed.
///
/// # Errors
///
/// `Error al generar Excel` when listing, writing or reading back fails.
pub async fn download(
    State(state): State<AppState>,
    Extension(user): Extension<SessionUser>,
) -> ApiResult<Response> {
    let instruments = state
        .store
        .list_instruments()
        .await
        .map_err(|e| ApiError::ExportError(e.to_string()))?;
    let rows = instruments.len();

    let dir = state.config.storage.upload_dir.clone();
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ApiError::ExportError(format!("{}: {}", dir.display(), e)))?;

    let path = dir.join(format!("instrumentos-{}.xlsx", Uuid::new_v4()));
    let bytes = render_export(instruments, &path).await?;

    tracing::info!(correo = %user.correo, rows, "Spreadsheet exported");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DOWNLOAD_FILE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Writes the workbook to `path`, reads it back and removes the file
///
/// The file is removed whether the write succeeded or not, so a partially
/// written workbook never stays behind.
async fn render_export(instruments: Vec<Instrument>, path: &Path) -> ApiResult<Vec<u8>> {
    let target = path.to_path_buf();
    let written = tokio::task::spawn_blocking(move || write_workbook(&instruments, &target))
        .await
        .map_err(|e| ApiError::ExportError(e.to_string()))
        .and_then(|result| result.map_err(|e| ApiError::ExportError(e.to_string())));

    let read = match written {
        Ok(()) => tokio::fs::read(path)
            .await
            .map_err(|e| ApiError::ExportError(e.to_string())),
        Err(e) => Err(e),
    };

    match tokio::fs::remove_file(path).await {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove export file");
        }
    }

    read
}
