/// Application state and router builder
///
/// This module defines the shared application state and builds the Axum
/// router with every route, the authorization gate and the middleware
/// stack.

use crate::{
    config::Config,
    middleware::{
        gate::{require_roles, require_session},
        security::SecurityHeadersLayer,
    },
    routes,
};
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
    Router,
};
use labinv_shared::{auth::authorization::RoleSet, store::Store};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// User and instrument persistence
    pub store: Arc<dyn Store>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(store: Arc<dyn Store>, config: Config) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── GET  /health                         public
/// ├── /api/auth
/// │   ├── POST /login                      public
/// │   ├── POST /logout                     public
/// │   └── POST /register                   ADMIN
/// ├── /api/usuarios
/// │   ├── GET    /                         ADMIN
/// │   ├── PUT    /:id                      ADMIN
/// │   └── DELETE /:id                      ADMIN
/// ├── /api/instrumentos
/// │   ├── GET    /                         any session
/// │   ├── GET    /buscar?q=                any session
/// │   ├── GET    /download                 any session
/// │   ├── POST   /                         ADMIN, ASISTENTE
/// │   ├── PUT    /:id                      ADMIN, ASISTENTE
/// │   ├── POST   /upload                   ADMIN, ASISTENTE
/// │   └── DELETE /:id                      ADMIN
/// └── everything else                      static files from PUBLIC_DIR
/// ```
///
/// Protected groups share paths but not methods, so they merge cleanly.
///
/// # Middleware Stack
///
/// Outermost first: security headers, CORS, request tracing, sessions,
/// then per-group `require_session` and `require_roles`.
pub fn build_router<S>(state: AppState, sessions: S) -> Router
where
    S: SessionStore + Clone,
{
    // Public
    let public_routes = Router::new()
        .route("/health", get(routes::health::health_check))
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/logout", post(routes::auth::logout));

    // Any logged-in role
    let session_routes = Router::new()
        .route("/api/instrumentos", get(routes::instrumentos::list))
        .route("/api/instrumentos/buscar", get(routes::instrumentos::search))
        .route("/api/instrumentos/download", get(routes::bulk::download))
        .route_layer(from_fn_with_state(RoleSet::ANY, require_roles))
        .route_layer(from_fn(require_session));

    // ADMIN and ASISTENTE
    let editor_routes = Router::new()
        .route("/api/instrumentos", post(routes::instrumentos::create))
        .route("/api/instrumentos/:id", put(routes::instrumentos::update))
        .route("/api/instrumentos/upload", post(routes::bulk::upload))
        .route_layer(from_fn_with_state(RoleSet::EDITORS, require_roles))
        .route_layer(from_fn(require_session));

    // ADMIN only
    let admin_routes = Router::new()
        .route("/api/auth/register", post(routes::auth::register))
        .route("/api/usuarios", get(routes::usuarios::list))
        .route(
            "/api/usuarios/:id",
            put(routes::usuarios::update).delete(routes::usuarios::delete),
        )
        .route("/api/instrumentos/:id", delete(routes::instrumentos::delete))
        .route_layer(from_fn_with_state(RoleSet::ADMIN, require_roles))
        .route_layer(from_fn(require_session));

    let mut session_layer = SessionManagerLayer::new(sessions)
        .with_name("labinv.sid")
        .with_http_only(true)
        .with_secure(state.config.api.production);
    if let Some(minutes) = state.config.session.idle_minutes {
        session_layer =
            session_layer.with_expiry(Expiry::OnInactivity(time::Duration::minutes(minutes)));
    }

    let static_files = ServeDir::new(&state.config.storage.public_dir);

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(editor_routes)
        .merge(admin_routes)
        .fallback_service(static_files)
        .layer(DefaultBodyLimit::max(state.config.storage.upload_max_bytes))
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Permissive CORS for `*`, otherwise the configured origins with cookies
fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(3600))
}

