/// Request extractors that answer with the API envelope
///
/// Axum's own `Json`, `Form` and `Path` reject with plain-text 400/415/422
/// responses. The extractors here fold those cases into [`ApiError`] so
/// every failure keeps the `{ "ok": false, "msg": ... }` shape.

use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::{header, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;
use std::convert::Infallible;

use crate::error::ApiError;

/// Request body read as JSON or as an urlencoded form
///
/// - `application/x-www-form-urlencoded` is decoded as a form
/// - `application/json` with a non-empty body is decoded as JSON
/// - anything else, including no body at all, is decoded as `{}`
///
/// A body that doesn't fit `T` is rejected with [`ApiError::MissingFields`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Payload<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for Payload<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_ascii_lowercase())
            .unwrap_or_default();

        if content_type.starts_with("application/x-www-form-urlencoded") {
            let Form(value) = Form::<T>::from_request(req, state).await.map_err(|e| {
                tracing::debug!(error = %e, "Rejected form body");
                ApiError::MissingFields
            })?;
            return Ok(Payload(value));
        }

        let bytes = Bytes::from_request(req, state).await.map_err(|e| {
            tracing::debug!(error = %e, "Failed to read request body");
            ApiError::MissingFields
        })?;
        let json = if content_type.starts_with("application/json") && !bytes.is_empty() {
            bytes
        } else {
            Bytes::from_static(b"{}")
        };

        let Json(value) = Json::<T>::from_bytes(&json).map_err(|e| {
            tracing::debug!(error = %e, "Rejected JSON body");
            ApiError::MissingFields
        })?;
        Ok(Payload(value))
    }
}

/// Numeric `:id` path segment
///
/// `None` when the segment isn't an integer. No row can have such an ID,
/// so handlers treat it like any other missing ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordId(pub Option<i32>);

#[async_trait]
impl<S> FromRequestParts<S> for RecordId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let id = Path::<i32>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|Path(id)| id);
        Ok(RecordId(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use serde::Deserialize;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Sample {
        #[serde(default)]
        nombre: Option<String>,
    }

    async fn extract(content_type: Option<&str>, body: &'static str) -> Result<Sample, ApiError> {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body)).unwrap();
        Payload::<Sample>::from_request(request, &())
            .await
            .map(|Payload(sample)| sample)
    }

    #[tokio::test]
    async fn test_reads_json_and_form() {
        let json = extract(Some("application/json"), r#"{"nombre":"Pipeta"}"#).await.unwrap();
        assert_eq!(json.nombre.as_deref(), Some("Pipeta"));

        let form = extract(Some("application/x-www-form-urlencoded"), "nombre=Pipeta")
            .await
            .unwrap();
        assert_eq!(form.nombre.as_deref(), Some("Pipeta"));
    }

    #[tokio::test]
    async fn test_missing_body_or_type_reads_as_empty_object() {
        assert_eq!(extract(None, "").await.unwrap(), Sample::default());
        assert_eq!(extract(Some("application/json"), "").await.unwrap(), Sample::default());
        assert_eq!(extract(None, r#"{"nombre":"x"}"#).await.unwrap(), Sample::default());
    }

    #[tokio::test]
    async fn test_mistyped_body_is_missing_fields() {
        let err = extract(Some("application/json"), r#"{"nombre":5}"#).await.unwrap_err();
        assert!(matches!(err, ApiError::MissingFields));

        let err = extract(Some("application/json"), "{not json").await.unwrap_err();
        assert!(matches!(err, ApiError::MissingFields));
    }
}
