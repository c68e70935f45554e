/// Embedded schema migrations
///
/// The SQL files under `labinv-shared/migrations/` are compiled into the
/// binary and applied at startup. Each file is named
/// `{timestamp}_{name}.sql`.

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::{info, warn};

/// Migrations compiled into the binary
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration
///
/// # Errors
///
/// Returns an error if a migration fails to apply or the database
/// connection is lost midway.
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    info!(
        available = MIGRATOR.iter().count(),
        "Applying database migrations"
    );

    match MIGRATOR.run(pool).await {
        Ok(()) => {
            info!("Database schema is up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_migration_is_embedded() {
        let descriptions: Vec<_> = MIGRATOR.iter().map(|m| m.description.to_string()).collect();
        assert_eq!(descriptions, vec!["inventory schema".to_string()]);
    }
}
