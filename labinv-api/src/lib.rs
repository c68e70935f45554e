//! # Labinv API Server Library
//!
//! HTTP surface of the laboratory inventory manager.
//!
//! ## Modules
//!
//! - `app`: application state and router builder
//! - `config`: configuration from the environment
//! - `error`: error type and the `{ ok, msg, data }` response envelope
//! - `extract`: body and path extractors that reject with the envelope
//! - `middleware`: authorization gate and security headers
//! - `routes`: route handlers
//! - `bootstrap`: startup tasks (seeding the first administrator)

pub mod app;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
