/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: health check endpoint
/// - `auth`: login, logout and user registration
/// - `usuarios`: user management (ADMIN)
/// - `instrumentos`: instrument listing, search and CRUD
/// - `bulk`: spreadsheet upload and download
///
/// Access control is applied in the router, not here.

pub mod auth;
pub mod bulk;
pub mod health;
pub mod instrumentos;
pub mod usuarios;
