//! # Chirpy API Server
//!
//! Serves the Chirpy JSON API under `/api`, the admin pages under `/admin`,
//! and static files under `/app`.
//!
//! ## Startup
//!
//! 1. Load configuration from the environment (`.env` honored)
//! 2. Connect to PostgreSQL and run migrations, or fall back to in-memory
//!    stores when `DATABASE_URL` is unset
//! 3. Start the refresh token purge task
//! 4. Serve until Ctrl-C, then drain connections and close the pool
//!
//! ## Usage
//!
//! ```bash
//! JWT_SECRET=$(openssl rand -hex 32) cargo run -p chirpy-api
//! ```

use chirpy_api::{
    app::{build_router, AppState},
    config::Config,
};
use chirpy_shared::{
    auth::refresh::spawn_purge_task,
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chirpy_api=debug,chirpy_shared=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Chirpy API Server v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    tracing::debug!(?config, "Configuration loaded");

    let bind_address = config.bind_address();
    let purge = config.refresh_tokens;

    let (state, pool) = match config.database.clone() {
        Some(db) => {
            let pool = create_pool(DatabaseConfig {
                url: db.url,
                max_connections: db.max_connections,
                ..DatabaseConfig::default()
            })
            .await?;
            run_migrations(&pool).await?;

            (AppState::postgres(pool.clone(), config), Some(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, using in-memory stores; data is lost on exit");
            (AppState::in_memory(config), None)
        }
    };

    let retention = purge
        .retention()
        .ok_or_else(|| anyhow::anyhow!("REFRESH_TOKEN_RETENTION_DAYS is out of range"))?;

    let purge_task = (purge.purge_interval_secs > 0).then(|| {
        spawn_purge_task(
            state.sessions.refresh_tokens().clone(),
            std::time::Duration::from_secs(purge.purge_interval_secs),
            retention,
        )
    });

    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(task) = purge_task {
        task.abort();
    }

    if let Some(pool) = pool {
        close_pool(pool).await;
    }

    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
