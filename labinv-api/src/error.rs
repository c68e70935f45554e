/// Error handling for the API server
///
/// Every handler returns `ApiResult<T>`. Failures are rendered as the
/// envelope `{ "ok": false, "msg": "..." }`. Only the gate and request
/// validation change the status code:
///
/// | Variant | Status |
/// |---|---|
/// | `Unauthenticated` | 401 |
/// | `Forbidden` | 403 |
/// | `MissingFields` | 400 |
/// | everything else | 200 |
///
/// Store failures are logged with their cause and answered with a generic
/// per-operation message.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use labinv_shared::auth::authorization::AuthzError;
use serde::Serialize;
use std::fmt;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// No authenticated session (401)
    Unauthenticated,

    /// The session's role may not perform the operation (403)
    Forbidden,

    /// Required request fields are missing or empty, or the body is unreadable (400)
    MissingFields,

    /// A looked-up record doesn't exist
    NotFound(&'static str),

    /// The correo is already registered
    DuplicateEmail,

    /// Login failed: wrong password or the hash couldn't be checked
    InvalidCredential(&'static str),

    /// The upload couldn't be read as a spreadsheet
    ParseError(String),

    /// The export file couldn't be produced
    ExportError(String),

    /// Data access failure; `msg` goes to the client, `detail` to the log
    Store { msg: &'static str, detail: String },
}

/// Response envelope shared by every JSON endpoint
#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize = ()> {
    pub ok: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl Envelope<()> {
    /// `{ "ok": true }`
    pub fn success() -> Self {
        Self {
            ok: true,
            msg: None,
            data: None,
        }
    }

    /// `{ "ok": false, "msg": msg }`
    pub fn failure(msg: impl Into<String>) -> Self {
        Self {
            ok: false,
            msg: Some(msg.into()),
            data: None,
        }
    }
}

impl<T: Serialize> Envelope<T> {
    /// `{ "ok": true, "data": data }`
    pub fn with_data(data: T) -> Self {
        Self {
            ok: true,
            msg: None,
            data: Some(data),
        }
    }
}

impl ApiError {
    /// Maps any error into `ApiError::Store` with a client-facing message
    ///
    /// ```text
    /// state.store.list_users().await.map_err(ApiError::store("Error al obtener usuarios"))?;
    /// ```
    pub fn store<E: fmt::Display>(msg: &'static str) -> impl FnOnce(E) -> ApiError {
        move |err| ApiError::Store {
            msg,
            detail: err.to_string(),
        }
    }

    /// Status code and client-facing message
    fn status_and_message(&self) -> (StatusCode, &str) {
        match self {
            ApiError::Unauthenticated => (StatusCode::UNAUTHORIZED, "No has iniciado sesión"),
            ApiError::Forbidden => (StatusCode::FORBIDDEN, "No autorizado"),
            ApiError::MissingFields => (StatusCode::BAD_REQUEST, "Faltan datos"),
            ApiError::NotFound(msg) => (StatusCode::OK, *msg),
            ApiError::DuplicateEmail => (StatusCode::OK, "Ese correo ya existe"),
            ApiError::InvalidCredential(msg) => (StatusCode::OK, *msg),
            ApiError::ParseError(_) => (StatusCode::OK, "Error al procesar Excel"),
            ApiError::ExportError(_) => (StatusCode::OK, "Error al generar Excel"),
            ApiError::Store { msg, .. } => (StatusCode::OK, *msg),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Unauthenticated => write!(f, "Unauthenticated"),
            ApiError::Forbidden => write!(f, "Forbidden"),
            ApiError::MissingFields => write!(f, "Missing required fields"),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::DuplicateEmail => write!(f, "Duplicate correo"),
            ApiError::InvalidCredential(msg) => write!(f, "Invalid credential: {}", msg),
            ApiError::ParseError(detail) => write!(f, "Spreadsheet parse error: {}", detail),
            ApiError::ExportError(detail) => write!(f, "Spreadsheet export error: {}", detail),
            ApiError::Store { msg, detail } => write!(f, "Store error ({}): {}", msg, detail),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Store { msg, detail } => {
                tracing::error!(operation = %msg, error = %detail, "Store operation failed");
            }
            ApiError::ParseError(detail) => {
                tracing::warn!(error = %detail, "Rejected spreadsheet upload");
            }
            ApiError::ExportError(detail) => {
                tracing::error!(error = %detail, "Spreadsheet export failed");
            }
            _ => {}
        }

        let (status, msg) = self.status_and_message();
        (status, Json(Envelope::failure(msg))).into_response()
    }
}

/// Convert authorization errors to API errors
impl From<AuthzError> for ApiError {
    fn from(err: AuthzError) -> Self {
        match err {
            AuthzError::RoleNotAllowed { .. } => ApiError::Forbidden,
        }
    }
}

/// Convert request validation failures to API errors
impl From<validator::ValidationErrors> for ApiError {
    fn from(_: validator::ValidationErrors) -> Self {
        ApiError::MissingFields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use labinv_shared::auth::authorization::RoleSet;
    use labinv_shared::models::user::Role;

    async fn render(err: ApiError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_gate_errors_change_status() {
        let (status, body) = render(ApiError::Unauthenticated).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, serde_json::json!({ "ok": false, "msg": "No has iniciado sesión" }));

        let (status, body) = render(ApiError::Forbidden).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["msg"], "No autorizado");

        let (status, body) = render(ApiError::MissingFields).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["msg"], "Faltan datos");
    }

    #[tokio::test]
    async fn test_business_errors_answer_ok_status() {
        let (status, body) = render(ApiError::InvalidCredential("Contraseña incorrecta")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert_eq!(body["msg"], "Contraseña incorrecta");
    }

    #[tokio::test]
    async fn test_store_detail_is_not_leaked() {
        let err = ApiError::store("Error al eliminar usuario")("connection reset by peer");
        let (status, body) = render(err).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["msg"], "Error al eliminar usuario");
        assert!(!body.to_string().contains("connection reset"));
    }

    #[test]
    fn test_authz_error_maps_to_forbidden() {
        let err = ApiError::from(AuthzError::RoleNotAllowed {
            actual: Role::Auditor,
            allowed: RoleSet::EDITORS,
        });
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[test]
    fn test_envelope_shapes() {
        assert_eq!(
            serde_json::to_value(Envelope::success()).unwrap(),
            serde_json::json!({ "ok": true })
        );
        assert_eq!(
            serde_json::to_value(Envelope::with_data(vec![1, 2])).unwrap(),
            serde_json::json!({ "ok": true, "data": [1, 2] })
        );
    }
}
