/// Instrument endpoints
///
/// - `GET /api/instrumentos` - List every instrument (any role)
/// - `GET /api/instrumentos/buscar?q=` - Substring search (any role)
/// - `POST /api/instrumentos` - Create (ADMIN, ASISTENTE)
/// - `PUT /api/instrumentos/:id` - Overwrite (ADMIN, ASISTENTE)
/// - `DELETE /api/instrumentos/:id` - Delete (ADMIN)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Envelope},
    extract::{Payload, RecordId},
};
use axum::{
    extract::{Query, State},
    Json,
};
use labinv_shared::models::instrument::{CreateInstrument, Instrument, UpdateInstrument};
use serde::Deserialize;
use validator::Validate;

/// Search query string
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Create request
///
/// `estado` defaults to `DISPONIBLE` and `ubicacion` to an empty string.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateInstrumentRequest {
    #[validate(required, length(min = 1))]
    pub nombre: Option<String>,

    #[validate(required, length(min = 1))]
    pub categoria: Option<String>,

    pub estado: Option<String>,
    pub ubicacion: Option<String>,
}

/// Update request: every column is overwritten
#[derive(Debug, Deserialize)]
pub struct UpdateInstrumentRequest {
    pub nombre: Option<String>,
    pub categoria: Option<String>,
    pub estado: Option<String>,
    pub ubicacion: Option<String>,
}

/// Lists every instrument ordered by ID
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<Instrument>>>> {
    let instruments = state
        .store
        .list_instruments()
        .await
        .map_err(ApiError::store("Error al obtener instrumentos"))?;

    Ok(Json(Envelope::with_data(instruments)))
}

/// Returns instruments whose nombre, categoria, estado or ubicacion contain `q`
///
/// An empty or missing `q` matches everything.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> ApiResult<Json<Envelope<Vec<Instrument>>>> {
    let instruments = state
        .store
        .search_instruments(&params.q)
        .await
        .map_err(ApiError::store("Error en búsqueda"))?;

    Ok(Json(Envelope::with_data(instruments)))
}

/// Creates an instrument
///
/// # Errors
///
/// - `400 Faltan datos`: nombre or categoria missing or empty, or an
///   unreadable body
/// - `Error al crear instrumento`: the insert failed
pub async fn create(
    State(state): State<AppState>,
    Payload(req): Payload<CreateInstrumentRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;

    let (Some(nombre), Some(categoria)) = (req.nombre, req.categoria) else {
        return Err(ApiError::MissingFields);
    };

    let instrument = state
        .store
        .create_instrument(CreateInstrument {
            nombre,
            categoria,
            estado: req.estado,
            ubicacion: req.ubicacion,
        })
        .await
        .map_err(ApiError::store("Error al crear instrumento"))?;

    tracing::debug!(instrument_id = instrument.id, "Instrument created");

    Ok(Json(Envelope::success()))
}

/// Overwrites an instrument
///
/// Missing `estado`/`ubicacion` reset to their defaults; a missing `nombre`
/// or `categoria` is rejected by the store.
pub async fn update(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Payload(req): Payload<UpdateInstrumentRequest>,
) -> ApiResult<Json<Envelope>> {
    let Some(id) = id else {
        return Ok(Json(Envelope::success()));
    };

    state
        .store
        .update_instrument(
            id,
            UpdateInstrument {
                nombre: req.nombre,
                categoria: req.categoria,
                estado: req.estado,
                ubicacion: req.ubicacion,
            },
        )
        .await
        .map_err(ApiError::store("Error al actualizar"))?;

    Ok(Json(Envelope::success()))
}

/// Deletes an instrument; a missing ID is not an error
pub async fn delete(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> ApiResult<Json<Envelope>> {
    let Some(id) = id else {
        return Ok(Json(Envelope::success()));
    };

    let touched = state
        .store
        .delete_instrument(id)
        .await
        .map_err(ApiError::store("Error al eliminar instrumento"))?;

    tracing::debug!(instrument_id = id, touched, "Instrument deleted");

    Ok(Json(Envelope::success()))
}
