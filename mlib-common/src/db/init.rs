//! Store initialization
//!
//! The pool returned here is the process-wide store handle. Callers own it and
//! pass it explicitly to every operation; [`close_database`] releases it.

use crate::db::schema_sync::SchemaSync;
use crate::db::tracks::TrackSchema;
use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{ConnectOptions, Connection, SqliteConnection, SqliteExecutor, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

/// Writers wait this long for the file lock before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_CONNECTIONS: u32 = 10;

/// Open (creating if needed) the store file and sync the tracks table
///
/// The table is synced on a connection of its own, closed before the pool
/// opens, so every pooled connection sees the final schema.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT);

    let mut conn = options.connect().await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    prepare(&mut conn).await?;
    conn.close().await?;

    let pool = SqlitePoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Isolated in-memory store, synced the same way as a file store
///
/// Each connection to `:memory:` is a separate database, so the pool holds
/// exactly one connection that never expires.
pub async fn init_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    let mut conn = pool.acquire().await?;
    prepare(&mut conn).await?;
    drop(conn);

    Ok(pool)
}

/// Round-trip a trivial query to prove the store answers
pub async fn verify_connection<'e>(executor: impl SqliteExecutor<'e>) -> Result<()> {
    sqlx::query("SELECT 1").execute(executor).await?;
    Ok(())
}

/// Close every connection, waiting for in-flight statements to finish
pub async fn close_database(pool: &SqlitePool) {
    pool.close().await;
    info!("Database connection closed");
}

async fn prepare(conn: &mut SqliteConnection) -> Result<()> {
    verify_connection(&mut *conn).await?;
    info!("Database connection established");

    SchemaSync::sync_table::<TrackSchema>(conn).await?;
    Ok(())
}
