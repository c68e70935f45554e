/// PostgreSQL-backed store
///
/// Thin adapter that routes the [`Store`](super::Store) traits to the model
/// operations in [`crate::models`].

use async_trait::async_trait;
use sqlx::PgPool;

use super::{InstrumentStore, Store, StoreResult, UserStore};
use crate::db::pool;
use crate::models::instrument::{CreateInstrument, Instrument, UpdateInstrument};
use crate::models::user::{CreateUser, UpdateUser, User, UserSummary};

/// Store backed by a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_correo(&self, correo: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_correo(&self.pool, correo).await?)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> StoreResult<bool> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl InstrumentStore for PgStore {
    async fn list_instruments(&self) -> StoreResult<Vec<Instrument>> {
        Ok(Instrument::list(&self.pool).await?)
    }

    async fn search_instruments(&self, query: &str) -> StoreResult<Vec<Instrument>> {
        Ok(Instrument::search(&self.pool, query).await?)
    }

    async fn create_instrument(&self, data: CreateInstrument) -> StoreResult<Instrument> {
        Ok(Instrument::create(&self.pool, data).await?)
    }

    async fn update_instrument(&self, id: i32, data: UpdateInstrument) -> StoreResult<bool> {
        Ok(Instrument::update(&self.pool, id, data).await?)
    }

    async fn delete_instrument(&self, id: i32) -> StoreResult<bool> {
        Ok(Instrument::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}
