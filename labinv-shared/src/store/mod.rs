/// Store abstraction over users and instruments
///
/// Handlers never talk to the database directly; they receive an
/// `Arc<dyn Store>` so the PostgreSQL implementation can be swapped for the
/// in-memory one in tests.
///
/// # Implementations
///
/// - [`postgres::PgStore`]: production store backed by a `PgPool`
/// - [`memory::InMemoryStore`]: test double (feature `test-support`)
///
/// Update and delete operations report whether a row was touched, but the
/// HTTP layer treats a missing ID as a successful no-op.

use async_trait::async_trait;

use crate::models::instrument::{CreateInstrument, Instrument, UpdateInstrument};
use crate::models::user::{CreateUser, UpdateUser, User, UserSummary};

#[cfg(any(test, feature = "test-support"))]
pub mod memory;
pub mod postgres;

#[cfg(any(test, feature = "test-support"))]
pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The correo is already taken by another user
    #[error("Correo already exists: {0}")]
    DuplicateCorreo(String),

    /// A required column was missing
    #[error("Column {0} cannot be null")]
    MissingColumn(&'static str),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation()
                && db_err.constraint().is_some_and(|c| c.contains("correo"))
            {
                return StoreError::DuplicateCorreo(db_err.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Credential store operations
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds the full user row (hash included) for a correo
    async fn find_user_by_correo(&self, correo: &str) -> StoreResult<Option<User>>;

    /// Inserts a user
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Lists all users without hashes, ordered by ID
    async fn list_users(&self) -> StoreResult<Vec<UserSummary>>;

    /// Overwrites a user; returns false when the ID didn't exist
    async fn update_user(&self, id: i32, data: UpdateUser) -> StoreResult<bool>;

    /// Deletes a user; returns false when the ID didn't exist
    async fn delete_user(&self, id: i32) -> StoreResult<bool>;
}

/// Inventory store operations
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    /// Lists all instruments, ordered by ID
    async fn list_instruments(&self) -> StoreResult<Vec<Instrument>>;

    /// Substring search over nombre, categoria, estado and ubicacion
    async fn search_instruments(&self, query: &str) -> StoreResult<Vec<Instrument>>;

    /// Inserts an instrument
    async fn create_instrument(&self, data: CreateInstrument) -> StoreResult<Instrument>;

    /// Overwrites an instrument; returns false when the ID didn't exist
    async fn update_instrument(&self, id: i32, data: UpdateInstrument) -> StoreResult<bool>;

    /// Deletes an instrument; returns false when the ID didn't exist
    async fn delete_instrument(&self, id: i32) -> StoreResult<bool>;
}

/// Everything the request handlers need from persistence
#[async_trait]
pub trait Store: UserStore + InstrumentStore {
    /// Checks that the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;
}
