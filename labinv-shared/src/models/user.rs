/// User model and database operations
///
/// This module provides the staff account model and its CRUD operations.
/// Every account carries exactly one of the three fixed roles.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE rol_usuario AS ENUM ('ADMIN', 'ASISTENTE', 'AUDITOR');
///
/// CREATE TABLE usuarios (
///     id SERIAL PRIMARY KEY,
///     nombre VARCHAR(255) NOT NULL,
///     correo VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     rol rol_usuario NOT NULL DEFAULT 'ASISTENTE'
/// );
/// ```
///
/// # Roles
///
/// - **ADMIN**: manages users, full instrument access
/// - **ASISTENTE**: creates, edits and imports instruments
/// - **AUDITOR**: read-only access to instruments

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;

/// Fixed staff roles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "rol_usuario", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Full control over users and instruments
    Admin,

    /// Can create, edit and import instruments
    Asistente,

    /// Read-only access to instruments
    Auditor,
}

impl Role {
    /// All roles, in declaration order
    pub const ALL: [Role; 3] = [Role::Admin, Role::Asistente, Role::Auditor];

    /// Converts role to its stored/wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Asistente => "ASISTENTE",
            Role::Auditor => "AUDITOR",
        }
    }

    /// Parses an exact role name
    ///
    /// Matching is case-sensitive: `"admin"` is not a role.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == value)
    }

    /// Resolves a client-supplied role against the closed set
    ///
    /// Anything that is not exactly one of the three names, including an
    /// omitted or empty value, degrades to `ASISTENTE`.
    pub fn normalize(value: Option<&str>) -> Self {
        value.and_then(Self::parse).unwrap_or(Role::Asistente)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full user row, including the password hash
///
/// Never serialize this to clients; use [`UserSummary`] instead.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Auto-incremented ID
    pub id: i32,

    /// Display name
    pub nombre: String,

    /// Login email, unique across all users
    pub correo: String,

    /// Argon2id PHC string
    pub password_hash: String,

    /// Assigned role
    pub rol: Role,
}

/// Public projection of a user (no password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct UserSummary {
    pub id: i32,
    pub nombre: String,
    pub correo: String,
    pub rol: Role,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            nombre: user.nombre,
            correo: user.correo,
            rol: user.rol,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub nombre: String,
    pub correo: String,

    /// Argon2id hash (NOT the plaintext password)
    pub password_hash: String,

    pub rol: Role,
}

/// Input for overwriting an existing user
///
/// `nombre`, `correo` and `rol` are always written. A `None` name or email
/// is written as NULL and rejected by the table constraints.
/// `password_hash` is only written when present.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub nombre: Option<String>,
    pub correo: Option<String>,
    pub rol: Role,
    pub password_hash: Option<String>,
}

impl User {
    /// Inserts a new user and returns the stored row
    ///
    /// # Errors
    ///
    /// Returns an error if the correo already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO usuarios (nombre, correo, password_hash, rol)
            VALUES ($1, $2, $3, $4)
            RETURNING id, nombre, correo, password_hash, rol
            "#,
        )
        .bind(data.nombre)
        .bind(data.correo)
        .bind(data.password_hash)
        .bind(data.rol)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by correo (exact match)
    pub async fn find_by_correo(pool: &PgPool, correo: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, nombre, correo, password_hash, rol
            FROM usuarios
            WHERE correo = $1
            "#,
        )
        .bind(correo)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists every user, ordered by ID, without password hashes
    pub async fn list(pool: &PgPool) -> Result<Vec<UserSummary>, sqlx::Error> {
        let users = sqlx::query_as::<_, UserSummary>(
            "SELECT id, nombre, correo, rol FROM usuarios ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Overwrites a user's fields
    ///
    /// The password hash column is only touched when `data.password_hash`
    /// is `Some`.
    ///
    /// # Returns
    ///
    /// True if a row was updated, false if the ID didn't exist
    pub async fn update(pool: &PgPool, id: i32, data: UpdateUser) -> Result<bool, sqlx::Error> {
        let result = match data.password_hash {
            Some(password_hash) => {
                sqlx::query(
                    r#"
                    UPDATE usuarios
                    SET nombre = $2, correo = $3, rol = $4, password_hash = $5
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(data.nombre)
                .bind(data.correo)
                .bind(data.rol)
                .bind(password_hash)
                .execute(pool)
                .await?
            }
            None => {
                sqlx::query(
                    r#"
                    UPDATE usuarios
                    SET nombre = $2, correo = $3, rol = $4
                    WHERE id = $1
                    "#,
                )
                .bind(id)
                .bind(data.nombre)
                .bind(data.correo)
                .bind(data.rol)
                .execute(pool)
                .await?
            }
        };

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM usuarios WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Counts users with the given correo
    pub async fn count_by_correo(pool: &PgPool, correo: &str) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM usuarios WHERE correo = $1")
            .bind(correo)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
