//! # Labinv Shared Library
//!
//! Domain types, persistence and the bulk spreadsheet adapter used by the
//! laboratory inventory API server.
//!
//! ## Module Organization
//!
//! - `models`: users, roles and instruments with their SQL queries
//! - `store`: the `Store` trait the handlers depend on, with PostgreSQL and
//!   in-memory implementations
//! - `auth`: password hashing, session identity and role checks
//! - `bulk`: spreadsheet import and export
//! - `db`: connection pool and embedded migrations

pub mod auth;
pub mod bulk;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the labinv shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
