#![allow(dead_code)]

/// Common test utilities for integration tests
///
/// Builds the full router over an in-memory store and an in-memory
/// session store, seeded with one user per role. Every seeded user has the
/// password [`PASSWORD`].

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use labinv_api::app::{build_router, AppState};
use labinv_api::config::Config;
use labinv_shared::auth::password::hash_password;
use labinv_shared::models::instrument::{CreateInstrument, Instrument};
use labinv_shared::models::user::{CreateUser, Role, User};
use labinv_shared::store::{InMemoryStore, InstrumentStore, UserStore};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use tower::ServiceExt;
use tower_sessions::MemoryStore;
use uuid::Uuid;

/// Password of every seeded user
pub const PASSWORD: &str = "secreta123";

pub const ADMIN_CORREO: &str = "admin@lab.test";
pub const ASISTENTE_CORREO: &str = "asistente@lab.test";
pub const AUDITOR_CORREO: &str = "auditor@lab.test";

/// Argon2 is slow on purpose; hash the shared password once per test binary
fn seeded_hash() -> String {
    static HASH: OnceLock<String> = OnceLock::new();
    HASH.get_or_init(|| hash_password(PASSWORD).unwrap()).clone()
}

/// Test context containing the router and its backing stores
pub struct TestContext {
    pub app: Router,
    pub store: Arc<InMemoryStore>,
    pub admin: User,
    pub asistente: User,
    pub auditor: User,
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a context with default configuration
    pub async fn new() -> Self {
        Self::with_vars(&[]).await
    }

    /// Creates a context with extra configuration variables
    pub async fn with_vars(vars: &[(&str, &str)]) -> Self {
        let root = std::env::temp_dir().join(format!("labinv-test-{}", Uuid::new_v4()));
        let public_dir = root.join("public");
        std::fs::create_dir_all(&public_dir).unwrap();
        std::fs::write(public_dir.join("index.html"), "<h1>Inventario</h1>").unwrap();

        let mut env: HashMap<String, String> = HashMap::from([
            ("DATABASE_URL".to_string(), "postgresql://unused/labinv".to_string()),
            ("PUBLIC_DIR".to_string(), public_dir.display().to_string()),
            ("UPLOAD_DIR".to_string(), root.join("uploads").display().to_string()),
        ]);
        for (key, value) in vars {
            env.insert(key.to_string(), value.to_string());
        }
        let config = Config::from_lookup(|key| env.get(key).cloned()).unwrap();

        let store = Arc::new(InMemoryStore::new());
        let admin = seed_user(&store, "Admin", ADMIN_CORREO, Role::Admin).await;
        let asistente = seed_user(&store, "Asistente", ASISTENTE_CORREO, Role::Asistente).await;
        let auditor = seed_user(&store, "Auditor", AUDITOR_CORREO, Role::Auditor).await;

        let state = AppState::new(store.clone(), config);
        let app = build_router(state, MemoryStore::default());

        TestContext {
            app,
            store,
            admin,
            asistente,
            auditor,
            root,
        }
    }

    /// Sends a request and returns the raw response
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Sends a JSON request, optionally with a session cookie
    pub async fn json(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        read_json(self.send(request).await).await
    }

    /// Sends a raw body with an optional Content-Type, optionally with a session cookie
    pub async fn raw(
        &self,
        method: Method,
        uri: &str,
        cookie: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();

        read_json(self.send(request).await).await
    }

    /// Posts credentials to the login endpoint
    ///
    /// Returns the status, the body and the session cookie if one was set.
    pub async fn login(&self, correo: &str, password: &str) -> (StatusCode, Value, Option<String>) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                serde_json::json!({ "correo": correo, "password": password }).to_string(),
            ))
            .unwrap();

        let response = self.send(request).await;
        let cookie = session_cookie(&response);
        let (status, body) = read_json(response).await;
        (status, body, cookie)
    }

    /// Logs in as the seeded user of `role` and returns the session cookie
    pub async fn cookie_for(&self, role: Role) -> String {
        let correo = match role {
            Role::Admin => ADMIN_CORREO,
            Role::Asistente => ASISTENTE_CORREO,
            Role::Auditor => AUDITOR_CORREO,
        };
        let (_, body, cookie) = self.login(correo, PASSWORD).await;
        assert_eq!(body["ok"], true, "login as {} failed: {}", correo, body);
        cookie.expect("login did not set a session cookie")
    }

    /// Inserts an instrument directly into the store
    pub async fn seed_instrument(&self, nombre: &str, categoria: &str) -> Instrument {
        self.store
            .create_instrument(CreateInstrument {
                nombre: nombre.to_string(),
                categoria: categoria.to_string(),
                estado: None,
                ubicacion: None,
            })
            .await
            .unwrap()
    }

    /// Current instruments in the store
    pub async fn instruments(&self) -> Vec<Instrument> {
        self.store.list_instruments().await.unwrap()
    }

    /// Directory the export scratch files are written to
    pub fn upload_dir(&self) -> PathBuf {
        self.root.join("uploads")
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

async fn seed_user(store: &InMemoryStore, nombre: &str, correo: &str, rol: Role) -> User {
    store
        .create_user(CreateUser {
            nombre: nombre.to_string(),
            correo: correo.to_string(),
            password_hash: seeded_hash(),
            rol,
        })
        .await
        .unwrap()
}

/// Extracts `name=value` from the response's Set-Cookie header
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_string())
}

/// Reads a response body as JSON
pub async fn read_json(response: Response) -> (StatusCode, Value) {
    let status = response.status();
    let bytes = read_bytes(response).await;
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| panic!("expected JSON, got: {}", String::from_utf8_lossy(&bytes)));
    (status, body)
}

/// Reads a response body to bytes
pub async fn read_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

/// Builds a multipart/form-data body with a single file field
///
/// Returns the Content-Type header value and the body.
pub fn multipart_file(field: &str, file_name: &str, contents: &[u8]) -> (String, Vec<u8>) {
    let boundary = "labinv-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, file_name
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    (format!("multipart/form-data; boundary={}", boundary), body)
}

/// Builds an upload request for the spreadsheet endpoint
pub fn upload_request(cookie: Option<&str>, field: &str, contents: &[u8]) -> Request<Body> {
    let (content_type, body) = multipart_file(field, "instrumentos.xlsx", contents);
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri("/api/instrumentos/upload")
        .header(header::CONTENT_TYPE, content_type);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Builds an xlsx workbook from rows of strings; empty strings are left blank
pub fn workbook(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = rust_xlsxwriter::Workbook::new();
    let worksheet = workbook.add_worksheet();
    for (r, row) in rows.iter().enumerate() {
        for (c, value) in row.iter().enumerate() {
            if !value.is_empty() {
                worksheet.write_string(r as u32, c as u16, *value).unwrap();
            }
        }
    }
    workbook.save_to_buffer().unwrap()
}
