//! # Store Migrations
//!
//! Embedded, versioned SQL migrations for the business-mode stores.
//!
//! ## Design
//! Migrations are an explicit ordered list, applied exactly once each and
//! tracked in `_sqlx_migrations`. Additive column changes live in their own
//! numbered files with their backfills; nothing is ever applied by
//! try-and-ignore-the-error.
//!
//! ## Adding New Migrations
//! 1. Create a new file in `migrations/sqlite/` with the next number
//! 2. Name format: `NNN_description.sql`
//! 3. Keep it additive; include any backfill in the same file
//! 4. NEVER modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Embedded migrations from the `migrations/sqlite` directory.
///
/// The `sqlx::migrate!()` macro embeds all SQL files at compile time;
/// no runtime file access is needed.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending migrations in order.
///
/// ## Safety
/// - Idempotent: safe to run multiple times
/// - Transactional: each migration runs in its own transaction
/// - Ordered: migrations run in filename order (001, 002, ...)
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!("All migrations applied");
    Ok(())
}

/// Returns (total_migrations, applied_migrations), for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
        .fetch_one(pool)
        .await
        .unwrap_or(0);

    Ok((total, applied as usize))
}
