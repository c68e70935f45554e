/// User management endpoints (ADMIN)
///
/// - `GET /api/usuarios` - List users, password hashes excluded
/// - `PUT /api/usuarios/:id` - Overwrite name, correo and role, optionally the password
/// - `DELETE /api/usuarios/:id` - Delete a user
///
/// Update and delete don't check that the user exists; a missing or
/// non-numeric ID is a successful no-op.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Envelope},
    extract::{Payload, RecordId},
};
use axum::{extract::State, Extension, Json};
use labinv_shared::{
    auth::{password, session::SessionUser},
    models::user::{Role, UpdateUser, UserSummary},
};
use serde::Deserialize;

/// Update request
///
/// A missing, empty or whitespace-only `password` keeps the current hash.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub rol: Option<String>,
    pub password: Option<String>,
}

/// Lists every user ordered by ID
pub async fn list(State(state): State<AppState>) -> ApiResult<Json<Envelope<Vec<UserSummary>>>> {
    let users = state
        .store
        .list_users()
        .await
        .map_err(ApiError::store("Error al obtener usuarios"))?;

    Ok(Json(Envelope::with_data(users)))
}

/// Updates a user
///
/// The role is normalized like on registration: unknown values become
/// ASISTENTE.
pub async fn update(
    State(state): State<AppState>,
    Extension(admin): Extension<SessionUser>,
    RecordId(id): RecordId,
    Payload(req): Payload<UpdateUserRequest>,
) -> ApiResult<Json<Envelope>> {
    let Some(id) = id else {
        return Ok(Json(Envelope::success()));
    };

    let password_hash = match password::non_blank(req.password.as_deref()) {
        Some(plain) => Some(
            password::hash_password(plain).map_err(ApiError::store("Error al actualizar"))?,
        ),
        None => None,
    };
    let rehashed = password_hash.is_some();

    let touched = state
        .store
        .update_user(
            id,
            UpdateUser {
                nombre: req.nombre,
                correo: req.correo,
                rol: Role::normalize(req.rol.as_deref()),
                password_hash,
            },
        )
        .await
        .map_err(ApiError::store("Error al actualizar"))?;

    tracing::info!(user_id = id, by = %admin.correo, touched, rehashed, "User updated");

    Ok(Json(Envelope::success()))
}

/// Deletes a user
pub async fn delete(
    State(state): State<AppState>,
    Extension(admin): Extension<SessionUser>,
    RecordId(id): RecordId,
) -> ApiResult<Json<Envelope>> {
    let Some(id) = id else {
        return Ok(Json(Envelope::success()));
    };

    let touched = state
        .store
        .delete_user(id)
        .await
        .map_err(ApiError::store("Error al eliminar usuario"))?;

    tracing::info!(user_id = id, by = %admin.correo, touched, "User deleted");

    Ok(Json(Envelope::success()))
}
