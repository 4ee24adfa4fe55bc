//! Schema migrations
//!
//! SQL files are read at runtime from a directory so the `sqlx` macros
//! feature stays disabled.

use std::path::Path;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::PgPool;
use tracing::info;

/// Migrations shipped with this crate
pub const MIGRATIONS_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/migrations");

/// Apply every pending migration found in `dir`
pub async fn run_migrations(pool: &PgPool, dir: &Path) -> Result<(), MigrateError> {
    let migrator = Migrator::new(dir).await?;
    info!(
        dir = %dir.display(),
        available = migrator.iter().count(),
        "Running database migrations"
    );
    migrator.run(pool).await?;
    info!("Database migrations complete");
    Ok(())
}
