/// Database migration runner
///
/// Migrations live in the workspace-level `migrations/` directory and are
/// embedded into the binary at compile time by `sqlx::migrate!`.
///
/// | Version | Creates |
/// |---------|---------|
/// | 20250101000001 | `users` |
/// | 20250101000002 | `refresh_tokens` (+ `user_id`, `expires_at` indexes) |
/// | 20250101000003 | `chirps` (+ `user_id`, `created_at` indexes) |
///
/// # Example
///
/// ```no_run
/// use chirpy_shared::db::pool::{create_pool, DatabaseConfig};
/// use chirpy_shared::db::migrations::run_migrations;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// run_migrations(&pool).await?;
/// # Ok(())
/// # }
/// ```

use sqlx::postgres::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// # Errors
///
/// Returns an error if a migration fails to apply; sqlx rolls that
/// migration back before returning.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Starting database migrations");

    match sqlx::migrate!("../migrations").run(pool).await {
        Ok(()) => {
            info!("All database migrations completed successfully");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {}", e);
            Err(e)
        }
    }
}
