//! # Database Migrations
//!
//! Embedded SQL migrations for the tax store.
//!
//! ## Migration Files
//! ```text
//! migrations/sqlite/
//! └── 001_tax_schema.sql   taxes, tax_assignments, tax_rules
//! ```
//!
//! The files are compiled into the binary by `sqlx::migrate!`, so a
//! deployed `stockroom-tax` needs nothing but its database file. sqlx
//! records each applied file (version + checksum) in `_sqlx_migrations` and
//! refuses to start if an applied file was edited afterwards.
//!
//! ## Adding a Migration
//! Add `NNN_description.sql` with the next number. Never edit a file that
//! has shipped.

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

/// Migrations embedded from `<workspace>/migrations/sqlite`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Applies every migration not yet recorded in `_sqlx_migrations`.
///
/// Each file runs in its own transaction; running this twice is a no-op.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(
        embedded = MIGRATOR.migrations.len(),
        "Checking for pending migrations"
    );

    MIGRATOR.run(pool).await?;

    info!("Database schema is up to date");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts.
///
/// ## Usage
/// For diagnostics (`stockroom-tax status`).
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    // The bookkeeping table does not exist until the first run.
    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}

// =============================================================================
// Unit Tests
// =============================================================================
