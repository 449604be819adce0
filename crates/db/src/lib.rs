//! PostgreSQL persistence for steamwatch.
//!
//! Three append-only tables back the service: `players` (snapshots),
//! `player_events` (presence transitions), and `audit_logs` (captured log
//! lines). Schema changes live in `db/migrations` at the workspace root.

use sqlx::postgres::PgPoolOptions;

pub mod models;
pub mod repositories;
pub mod search;

pub type DbPool = sqlx::PgPool;

/// Every table owned by the migrations, dropped by [`reset_database`].
const OWNED_TABLES: &str = "audit_logs, player_events, players, _sqlx_migrations";

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Run a trivial query to verify the connection is usable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

/// Apply all pending migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(pool).await
}

/// Drop every steamwatch table and recreate the schema from scratch.
///
/// Destroys all snapshots, events, and audit entries.
pub async fn reset_database(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    tracing::warn!("Dropping all tables and re-running migrations");
    sqlx::query(&format!("DROP TABLE IF EXISTS {OWNED_TABLES}"))
        .execute(pool)
        .await?;
    run_migrations(pool).await
}
