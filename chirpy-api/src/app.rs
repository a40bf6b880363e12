/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use chirpy_api::{app::{build_router, AppState}, config::Config};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let state = AppState::in_memory(config);
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, metrics::HitCounter, middleware::hits::count_hits};
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use chirpy_shared::{
    auth::{middleware::create_jwt_middleware, session::SessionManager},
    store::{
        memory::MemoryStore, postgres::PgStore, ChirpStore, RefreshTokenRepository, UserStore,
    },
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Credential persistence
    pub users: Arc<dyn UserStore>,

    /// Chirp persistence
    pub chirps: Arc<dyn ChirpStore>,

    /// Login, refresh and revoke
    pub sessions: Arc<SessionManager>,

    /// File server visit counter
    pub hits: Arc<HitCounter>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates application state from explicit stores
    pub fn new(
        users: Arc<dyn UserStore>,
        chirps: Arc<dyn ChirpStore>,
        refresh_tokens: Arc<dyn RefreshTokenRepository>,
        config: Config,
    ) -> Self {
        let sessions = SessionManager::new(users.clone(), refresh_tokens, config.jwt.secret.clone());

        Self {
            users,
            chirps,
            sessions: Arc::new(sessions),
            hits: Arc::new(HitCounter::new()),
            config: Arc::new(config),
        }
    }

    /// State backed by PostgreSQL
    pub fn postgres(pool: PgPool, config: Config) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// State backed by process memory (development and tests)
    pub fn in_memory(config: Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /app/*                        # Static files (counted)
/// ├── /admin/
/// │   ├── GET  /metrics             # Hit count page
/// │   └── POST /reset               # Dev only
/// └── /api/
///     ├── GET    /healthz
///     ├── POST   /users             # Register
///     ├── PUT    /users             # Change credentials (auth)
///     ├── POST   /login
///     ├── POST   /refresh           # Bearer <refresh token>
///     ├── POST   /revoke            # Bearer <refresh token>
///     ├── GET    /chirps
///     ├── POST   /chirps            # auth
///     ├── GET    /chirps/:chirp_id
///     ├── DELETE /chirps/:chirp_id  # auth + ownership
///     └── POST   /polka/webhooks    # ApiKey <key>
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Authentication (protected routes only)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let public_api = Router::new()
        .route("/healthz", get(routes::health::health_check))
        .route("/users", post(routes::users::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh))
        .route("/revoke", post(routes::auth::revoke))
        .route("/chirps", get(routes::chirps::list_chirps))
        .route("/chirps/:chirp_id", get(routes::chirps::get_chirp))
        .route("/polka/webhooks", post(routes::webhooks::polka));

    // Routes that require a valid access token
    let protected_api = Router::new()
        .route("/users", axum::routing::put(routes::users::update_credentials))
        .route("/chirps", post(routes::chirps::create_chirp))
        .route("/chirps/:chirp_id", axum::routing::delete(routes::chirps::delete_chirp))
        .route_layer(middleware::from_fn(create_jwt_middleware(state.config.jwt.secret.clone())));

    let admin_routes = Router::new()
        .route("/metrics", get(routes::admin::metrics))
        .route("/reset", post(routes::admin::reset));

    let file_server = Router::new()
        .nest_service("/app", ServeDir::new(&state.config.api.filepath_root))
        .layer(middleware::from_fn_with_state(state.hits.clone(), count_hits));

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.iter().any(|o| o == "*") {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .nest("/api", public_api.merge(protected_api))
        .nest("/admin", admin_routes)
        .merge(file_server)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}
