/// Configuration management for the API server
///
/// Loads configuration from environment variables (and a `.env` file in
/// development) into a type-safe struct.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `FILEPATH_ROOT`: Directory served under `/app` (default: `.`)
/// - `DATABASE_URL`: PostgreSQL connection string; unset means in-memory stores
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for access token signing (required, >= 32 chars)
/// - `PLATFORM`: `dev` or `prod` (default: prod); `dev` enables `/admin/reset`
/// - `POLKA_KEY`: API key expected on payment webhooks (unset: webhooks rejected)
/// - `REFRESH_TOKEN_PURGE_INTERVAL_SECS`: Expired-token GC interval (default: 3600, 0 disables)
/// - `REFRESH_TOKEN_RETENTION_DAYS`: How long expired tokens are kept (default: 30)
/// - `RUST_LOG`: Log filter (read by the tracing subscriber, not here)
///
/// # Example
///
/// ```no_run
/// use chirpy_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::{env, fmt, str::FromStr};

/// Minimum accepted signing secret length
const MIN_SECRET_LEN: usize = 32;

/// Upper bound for `REFRESH_TOKEN_RETENTION_DAYS` (100 years)
pub const MAX_RETENTION_DAYS: i64 = 36_500;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; `None` runs on in-memory stores
    pub database: Option<DatabaseConfig>,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Deployment platform
    pub platform: Platform,

    /// Payment webhook configuration
    pub polka: PolkaConfig,

    /// Refresh token garbage collection
    pub refresh_tokens: RefreshTokenConfig,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` means permissive
    pub cors_origins: Vec<String>,

    /// Root directory for static files
    pub filepath_root: String,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Secret key for access token signing
    ///
    /// IMPORTANT: This must be kept secret and should be at least 32 bytes.
    /// Generate with: `openssl rand -hex 32`
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig").field("secret", &"[REDACTED]").finish()
    }
}

/// Payment provider webhook configuration
#[derive(Clone, Default)]
pub struct PolkaConfig {
    pub api_key: Option<String>,
}

impl fmt::Debug for PolkaConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolkaConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Refresh token garbage collection settings
#[derive(Debug, Clone, Copy)]
pub struct RefreshTokenConfig {
    /// Seconds between purge runs; 0 disables the task
    pub purge_interval_secs: u64,

    /// Days an expired token is kept before deletion
    pub retention_days: i64,
}

impl RefreshTokenConfig {
    /// Retention as a duration; `None` if out of range
    pub fn retention(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_days(self.retention_days)
    }
}

/// Deployment platform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Local development; destructive admin endpoints enabled
    Dev,

    /// Everything else
    Prod,
}

impl FromStr for Platform {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Platform::Dev),
            "prod" => Ok(Platform::Prod),
            other => anyhow::bail!("PLATFORM must be 'dev' or 'prod', got '{}'", other),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `JWT_SECRET` is missing or shorter than 32 characters
    /// - A numeric variable does not parse
    /// - `PLATFORM` is not `dev` or `prod`
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_host = get("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let api_port = get("API_PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .map_err(|e| anyhow::anyhow!("API_PORT is invalid: {}", e))?;

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let filepath_root = get("FILEPATH_ROOT").unwrap_or_else(|| ".".to_string());

        let database = match get("DATABASE_URL") {
            Some(url) => {
                let max_connections = get("DATABASE_MAX_CONNECTIONS")
                    .unwrap_or_else(|| "10".to_string())
                    .parse::<u32>()
                    .map_err(|e| anyhow::anyhow!("DATABASE_MAX_CONNECTIONS is invalid: {}", e))?;
                Some(DatabaseConfig { url, max_connections })
            }
            None => None,
        };

        let jwt_secret =
            get("JWT_SECRET").ok_or_else(|| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let platform = match get("PLATFORM") {
            Some(value) => value.parse::<Platform>()?,
            None => Platform::Prod,
        };

        let purge_interval_secs = get("REFRESH_TOKEN_PURGE_INTERVAL_SECS")
            .unwrap_or_else(|| "3600".to_string())
            .parse::<u64>()
            .map_err(|e| anyhow::anyhow!("REFRESH_TOKEN_PURGE_INTERVAL_SECS is invalid: {}", e))?;

        let retention_days = get("REFRESH_TOKEN_RETENTION_DAYS")
            .unwrap_or_else(|| "30".to_string())
            .parse::<i64>()
            .map_err(|e| anyhow::anyhow!("REFRESH_TOKEN_RETENTION_DAYS is invalid: {}", e))?;

        if !(0..=MAX_RETENTION_DAYS).contains(&retention_days) {
            anyhow::bail!(
                "REFRESH_TOKEN_RETENTION_DAYS must be between 0 and {}",
                MAX_RETENTION_DAYS
            );
        }

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
                cors_origins,
                filepath_root,
            },
            database,
            jwt: JwtConfig { secret: jwt_secret },
            platform,
            polka: PolkaConfig {
                api_key: get("POLKA_KEY"),
            },
            refresh_tokens: RefreshTokenConfig {
                purge_interval_secs,
                retention_days,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn is_dev(&self) -> bool {
        self.platform == Platform::Dev
    }
}
