//! CrateDrop Storage
//!
//! `SQLite` read layer for the CrateDrop streaming server.
//!
//! The streaming path only reads: it resolves track records and checks
//! public playlist membership. Schema ownership stays with the wider
//! CrateDrop backend; the embedded migrations mirror that schema so a
//! fresh database (and the test suites) can be bootstrapped.
//!
//! # Example
//!
//! ```rust,no_run
//! use cratedrop_storage::{create_pool, run_migrations, SqliteCatalog};
//! use cratedrop_core::{TrackCatalog, TrackId};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = create_pool("sqlite://cratedrop.sqlite").await?;
//! run_migrations(&pool).await?;
//!
//! let catalog = SqliteCatalog::new(pool);
//! let track = catalog.get_track(&TrackId::new("abc")).await?;
//! # Ok(())
//! # }
//! ```

mod context;
mod error;

// Vertical slices
pub mod playlists;
pub mod tracks;

pub use context::SqliteCatalog;
pub use error::StorageError;

use sqlx::migrate::Migrator;
pub use sqlx::sqlite::SqlitePool;

// Embed migrations into binary
static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Run database migrations
///
/// # Errors
///
/// Returns an error if migrations fail to run
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await
}

/// Create a new `SQLite` pool
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string (e.g., `<sqlite://cratedrop.sqlite>`)
///
/// # Errors
///
/// Returns an error if the connection fails
pub async fn create_pool(database_url: &str) -> Result<SqlitePool, sqlx::Error> {
    use sqlx::sqlite::{
        SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
    };
    use std::str::FromStr;

    tracing::debug!(database_url, "creating sqlite pool");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    // Small pool: the server targets constrained hardware
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    tracing::debug!("sqlite pool ready");

    Ok(pool)
}
