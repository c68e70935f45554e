/// In-memory store used as a test double
///
/// Mirrors the table constraints of the PostgreSQL schema: unique `correo`,
/// NOT NULL name/email/category columns and the instrument column defaults.
/// Search is a case-sensitive substring match.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::{InstrumentStore, Store, StoreError, StoreResult, UserStore};
use crate::models::instrument::{
    CreateInstrument, Instrument, UpdateInstrument, DEFAULT_ESTADO, DEFAULT_UBICACION,
};
use crate::models::user::{CreateUser, UpdateUser, User, UserSummary};

#[derive(Debug, Default)]
struct Tables {
    usuarios: BTreeMap<i32, User>,
    instrumentos: BTreeMap<i32, Instrument>,
    next_usuario_id: i32,
    next_instrumento_id: i32,
}

impl Tables {
    fn correo_taken(&self, correo: &str, except: Option<i32>) -> bool {
        self.usuarios
            .values()
            .any(|u| u.correo == correo && Some(u.id) != except)
    }
}

/// Store that keeps both tables in process memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with the given correo
    pub async fn count_users_with_correo(&self, correo: &str) -> usize {
        let tables = self.tables.read().await;
        tables.usuarios.values().filter(|u| u.correo == correo).count()
    }

    /// Returns the stored password hash for a user ID
    pub async fn password_hash(&self, id: i32) -> Option<String> {
        let tables = self.tables.read().await;
        tables.usuarios.get(&id).map(|u| u.password_hash.clone())
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_user_by_correo(&self, correo: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.usuarios.values().find(|u| u.correo == correo).cloned())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;

        if tables.correo_taken(&data.correo, None) {
            return Err(StoreError::DuplicateCorreo(data.correo));
        }

        tables.next_usuario_id += 1;
        let user = User {
            id: tables.next_usuario_id,
            nombre: data.nombre,
            correo: data.correo,
            password_hash: data.password_hash,
            rol: data.rol,
        };
        tables.usuarios.insert(user.id, user.clone());

        Ok(user)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        let tables = self.tables.read().await;
        Ok(tables.usuarios.values().cloned().map(UserSummary::from).collect())
    }

    async fn update_user(&self, id: i32, data: UpdateUser) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if !tables.usuarios.contains_key(&id) {
            return Ok(false);
        }

        let nombre = data.nombre.ok_or(StoreError::MissingColumn("nombre"))?;
        let correo = data.correo.ok_or(StoreError::MissingColumn("correo"))?;

        if tables.correo_taken(&correo, Some(id)) {
            return Err(StoreError::DuplicateCorreo(correo));
        }

        let Some(user) = tables.usuarios.get_mut(&id) else {
            return Ok(false);
        };

        user.nombre = nombre;
        user.correo = correo;
        user.rol = data.rol;
        if let Some(password_hash) = data.password_hash {
            user.password_hash = password_hash;
        }

        Ok(true)
    }

    async fn delete_user(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.usuarios.remove(&id).is_some())
    }
}

#[async_trait]
impl InstrumentStore for InMemoryStore {
    async fn list_instruments(&self) -> StoreResult<Vec<Instrument>> {
        let tables = self.tables.read().await;
        Ok(tables.instrumentos.values().cloned().collect())
    }

    async fn search_instruments(&self, query: &str) -> StoreResult<Vec<Instrument>> {
        let tables = self.tables.read().await;
        Ok(tables
            .instrumentos
            .values()
            .filter(|i| {
                i.nombre.contains(query)
                    || i.categoria.contains(query)
                    || i.estado.contains(query)
                    || i.ubicacion.contains(query)
            })
            .cloned()
            .collect())
    }

    async fn create_instrument(&self, data: CreateInstrument) -> StoreResult<Instrument> {
        let mut tables = self.tables.write().await;

        tables.next_instrumento_id += 1;
        let instrument = Instrument {
            id: tables.next_instrumento_id,
            nombre: data.nombre,
            categoria: data.categoria,
            estado: data.estado.unwrap_or_else(|| DEFAULT_ESTADO.to_string()),
            ubicacion: data.ubicacion.unwrap_or_else(|| DEFAULT_UBICACION.to_string()),
        };
        tables.instrumentos.insert(instrument.id, instrument.clone());

        Ok(instrument)
    }

    async fn update_instrument(&self, id: i32, data: UpdateInstrument) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        if !tables.instrumentos.contains_key(&id) {
            return Ok(false);
        }

        let nombre = data.nombre.ok_or(StoreError::MissingColumn("nombre"))?;
        let categoria = data.categoria.ok_or(StoreError::MissingColumn("categoria"))?;

        let Some(instrument) = tables.instrumentos.get_mut(&id) else {
            return Ok(false);
        };

        instrument.nombre = nombre;
        instrument.categoria = categoria;
        instrument.estado = data.estado.unwrap_or_else(|| DEFAULT_ESTADO.to_string());
        instrument.ubicacion = data.ubicacion.unwrap_or_else(|| DEFAULT_UBICACION.to_string());

        Ok(true)
    }

    async fn delete_instrument(&self, id: i32) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.instrumentos.remove(&id).is_some())
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
