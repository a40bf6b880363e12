/// Database layer for Chirpy
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: embedded sqlx migration runner
///
/// Queries live next to their records in [`crate::models`].

pub mod migrations;
pub mod pool;
