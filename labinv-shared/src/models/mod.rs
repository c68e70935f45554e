/// Database models for the inventory manager
///
/// This module contains the persisted records and their CRUD operations
/// against PostgreSQL.
///
/// # Models
///
/// - `user`: Staff accounts, password hashes and roles
/// - `instrument`: Laboratory instruments (the inventory)

pub mod instrument;
pub mod user;
