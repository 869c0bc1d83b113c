//! Persistence adapters for the questline editor.
//!
//! - PostgreSQL: pool setup, migrations, row [`models`], zero-sized
//!   [`repositories`], and the [`PgContentStore`] / [`PgReferenceCatalog`]
//!   collaborators built on them.
//! - [`LocalAssetStore`]: filesystem-backed asset storage.
//! - [`memory`]: in-memory collaborators for tests and database-less runs.

pub mod assets;
pub mod memory;
pub mod models;
pub mod repositories;
pub mod stores;

use sqlx::postgres::PgPoolOptions;

pub use assets::LocalAssetStore;
pub use memory::{InMemoryAssetStore, InMemoryCatalog, InMemoryContentStore};
pub use stores::{PgContentStore, PgReferenceCatalog};

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to confirm the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply pending migrations from `db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}
