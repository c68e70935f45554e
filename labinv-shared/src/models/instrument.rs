/// Instrument model and database operations
///
/// Instruments are the inventory records of the laboratory. `estado` and
/// `ubicacion` are free-form strings with column defaults; nothing ties
/// `estado` to a closed set and `nombre` is not unique.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE instrumentos (
///     id SERIAL PRIMARY KEY,
///     nombre VARCHAR(255) NOT NULL,
///     categoria VARCHAR(255) NOT NULL,
///     estado VARCHAR(100) NOT NULL DEFAULT 'DISPONIBLE',
///     ubicacion VARCHAR(255) NOT NULL DEFAULT ''
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Default `estado` for new instruments
pub const DEFAULT_ESTADO: &str = "DISPONIBLE";

/// Default `ubicacion` for new instruments
pub const DEFAULT_UBICACION: &str = "";

/// Instrument row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Instrument {
    pub id: i32,
    pub nombre: String,
    pub categoria: String,
    pub estado: String,
    pub ubicacion: String,
}

/// Input for creating an instrument
///
/// `None` for `estado`/`ubicacion` lets the column defaults apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateInstrument {
    pub nombre: String,
    pub categoria: String,
    pub estado: Option<String>,
    pub ubicacion: Option<String>,
}

/// Input for overwriting an instrument
///
/// All four columns are written. `None` name or category is written as NULL
/// and rejected by the table constraints; `None` estado/ubicacion reset to
/// the defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateInstrument {
    pub nombre: Option<String>,
    pub categoria: Option<String>,
    pub estado: Option<String>,
    pub ubicacion: Option<String>,
}

impl Instrument {
    /// Inserts an instrument and returns the stored row
    pub async fn create(pool: &PgPool, data: CreateInstrument) -> Result<Self, sqlx::Error> {
        let instrument = sqlx::query_as::<_, Instrument>(
            r#"
            INSERT INTO instrumentos (nombre, categoria, estado, ubicacion)
            VALUES ($1, $2, COALESCE($3, $5), COALESCE($4, $6))
            RETURNING id, nombre, categoria, estado, ubicacion
            "#,
        )
        .bind(data.nombre)
        .bind(data.categoria)
        .bind(data.estado)
        .bind(data.ubicacion)
        .bind(DEFAULT_ESTADO)
        .bind(DEFAULT_UBICACION)
        .fetch_one(pool)
        .await?;

        Ok(instrument)
    }

    /// Lists every instrument, ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let instruments = sqlx::query_as::<_, Instrument>(
            "SELECT id, nombre, categoria, estado, ubicacion FROM instrumentos ORDER BY id",
        )
        .fetch_all(pool)
        .await?;

        Ok(instruments)
    }

    /// Substring search over the four text columns
    ///
    /// `query` is wrapped in `%...%` and matched with `LIKE`, so case
    /// sensitivity follows the column collation and an empty query matches
    /// every row. `%` and `_` inside the query keep their wildcard meaning.
    pub async fn search(pool: &PgPool, query: &str) -> Result<Vec<Self>, sqlx::Error> {
        let pattern = format!("%{}%", query);

        let instruments = sqlx::query_as::<_, Instrument>(
            r#"
            SELECT id, nombre, categoria, estado, ubicacion
            FROM instrumentos
            WHERE nombre LIKE $1 OR categoria LIKE $1 OR estado LIKE $1 OR ubicacion LIKE $1
            ORDER BY id
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(instruments)
    }

    /// Overwrites all four columns of an instrument
    ///
    /// # Returns
    ///
    /// True if a row was updated, false if the ID didn't exist
    pub async fn update(pool: &PgPool, id: i32, data: UpdateInstrument) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE instrumentos
            SET nombre = $2, categoria = $3,
                estado = COALESCE($4, $6), ubicacion = COALESCE($5, $7)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.nombre)
        .bind(data.categoria)
        .bind(data.estado)
        .bind(data.ubicacion)
        .bind(DEFAULT_ESTADO)
        .bind(DEFAULT_UBICACION)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes an instrument by ID
    ///
    /// # Returns
    ///
    /// True if the instrument was deleted, false if it didn't exist
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM instrumentos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
