/// Authentication endpoints
///
/// - `POST /api/auth/login` - Start a session
/// - `POST /api/auth/logout` - End the current session
/// - `POST /api/auth/register` - Create a user (ADMIN)
///
/// The session cookie is managed by `tower-sessions`; login stores a
/// [`SessionUser`] under [`SESSION_USER_KEY`] and logout flushes it.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, Envelope},
    extract::Payload,
};
use axum::{extract::State, Json};
use labinv_shared::{
    auth::{
        password,
        session::{SessionUser, SESSION_USER_KEY},
    },
    models::user::{CreateUser, Role},
    store::StoreError,
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use validator::Validate;

/// Login request
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub correo: String,

    #[serde(default)]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub ok: bool,

    /// Role of the logged-in user, used by the frontend to pick a view
    pub rol: Role,
}

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(required, length(min = 1))]
    pub nombre: Option<String>,

    #[validate(required, length(min = 1))]
    pub correo: Option<String>,

    #[validate(required, length(min = 1))]
    pub password: Option<String>,

    /// ADMIN, ASISTENTE or AUDITOR; anything else becomes ASISTENTE
    pub rol: Option<String>,
}

/// Logs a user in
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "correo": "ana@lab.test", "password": "secreta" }
/// ```
///
/// # Response
///
/// ```json
/// { "ok": true, "rol": "ADMIN" }
/// ```
///
/// # Errors
///
/// All answered with HTTP 200 and `ok: false`:
///
/// - `Correo no encontrado`: no user with that correo, or a body that
///   couldn't be read
/// - `Contraseña incorrecta`: password mismatch
/// - `Error al validar contraseña`: the stored hash couldn't be checked
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    payload: Result<Payload<LoginRequest>, ApiError>,
) -> ApiResult<Json<LoginResponse>> {
    let req = payload.map(|Payload(req)| req).unwrap_or_default();

    let user = state
        .store
        .find_user_by_correo(&req.correo)
        .await
        .map_err(ApiError::store("Error en servidor"))?
        .ok_or(ApiError::NotFound("Correo no encontrado"))?;

    match password::verify_password(&req.password, &user.password_hash) {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(correo = %user.correo, "Login rejected: wrong password");
            return Err(ApiError::InvalidCredential("Contraseña incorrecta"));
        }
        Err(e) => {
            tracing::error!(correo = %user.correo, error = %e, "Password verification failed");
            return Err(ApiError::InvalidCredential("Error al validar contraseña"));
        }
    }

    // New session id on privilege change
    session
        .cycle_id()
        .await
        .map_err(ApiError::store("Error en servidor"))?;
    session
        .insert(SESSION_USER_KEY, SessionUser::from(&user))
        .await
        .map_err(ApiError::store("Error en servidor"))?;

    tracing::info!(user_id = user.id, correo = %user.correo, rol = %user.rol, "User logged in");

    Ok(Json(LoginResponse {
        ok: true,
        rol: user.rol,
    }))
}

/// Logs the current user out
///
/// Always succeeds, with or without a session.
pub async fn logout(session: Session) -> Json<Envelope> {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to flush session on logout");
    }

    Json(Envelope::success())
}

/// Registers a new user (ADMIN)
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/register
/// Content-Type: application/json
///
/// { "nombre": "Ana", "correo": "ana@lab.test", "password": "secreta", "rol": "AUDITOR" }
/// ```
///
/// # Errors
///
/// - `400 Faltan datos`: nombre, correo or password missing or empty, or an
///   unreadable body
/// - `Ese correo ya existe`: the correo is taken
/// - `Error al encriptar contraseña`, `Error al guardar usuario`: server errors
pub async fn register(
    State(state): State<AppState>,
    Payload(req): Payload<RegisterRequest>,
) -> ApiResult<Json<Envelope>> {
    req.validate()?;

    let (Some(nombre), Some(correo), Some(plain)) = (req.nombre, req.correo, req.password) else {
        return Err(ApiError::MissingFields);
    };
    let rol = Role::normalize(req.rol.as_deref());

    let existing = state
        .store
        .find_user_by_correo(&correo)
        .await
        .map_err(ApiError::store("Error en servidor"))?;
    if existing.is_some() {
        return Err(ApiError::DuplicateEmail);
    }

    let password_hash =
        password::hash_password(&plain).map_err(ApiError::store("Error al encriptar contraseña"))?;

    let user = state
        .store
        .create_user(CreateUser {
            nombre,
            correo,
            password_hash,
            rol,
        })
        .await
        .map_err(|e| match e {
            StoreError::DuplicateCorreo(_) => ApiError::DuplicateEmail,
            other => ApiError::store("Error al guardar usuario")(other),
        })?;

    tracing::info!(user_id = user.id, correo = %user.correo, rol = %user.rol, "User registered");

    Ok(Json(Envelope::success()))
}
