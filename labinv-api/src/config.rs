/// Configuration management for the API server
///
/// Configuration is read from environment variables (a `.env` file is
/// loaded first when present).
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT` or `PORT`: port to bind to (default: 3000)
/// - `CORS_ORIGINS`: comma-separated origins, `*` for any (default: *)
/// - `PRODUCTION`: secure cookies and HSTS (default: false)
/// - `SESSION_IDLE_MINUTES`: idle session expiry, 1 to 525600 (default: browser session)
/// - `PUBLIC_DIR`: static frontend files (default: public)
/// - `UPLOAD_DIR`: scratch directory for generated files (default: uploads)
/// - `UPLOAD_MAX_BYTES`: request body limit for uploads (default: 10 MiB)
/// - `BOOTSTRAP_ADMIN_CORREO`, `BOOTSTRAP_ADMIN_PASSWORD`,
///   `BOOTSTRAP_ADMIN_NOMBRE`: seed an ADMIN account at startup
/// - `RUST_LOG`, `LOG_FORMAT`: read by the tracing setup in `main`

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

/// Default request body limit for spreadsheet uploads
pub const DEFAULT_UPLOAD_MAX_BYTES: usize = 10 * 1024 * 1024;

/// Accepted range for `SESSION_IDLE_MINUTES` (one minute to one year)
pub const SESSION_IDLE_MINUTES_RANGE: std::ops::RangeInclusive<i64> = 1..=525_600;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Session cookie configuration
    pub session: SessionConfig,

    /// Filesystem locations
    pub storage: StorageConfig,

    /// Administrator seeded at startup, if configured
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,

    /// Production mode: secure cookies and HSTS
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Session configuration
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Expire sessions after this many idle minutes (None = browser session)
    pub idle_minutes: Option<i64>,
}

/// Filesystem configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory served at `/`
    pub public_dir: PathBuf,

    /// Scratch directory for generated spreadsheets
    pub upload_dir: PathBuf,

    /// Maximum accepted request body size in bytes
    pub upload_max_bytes: usize,
}

/// Administrator account created at startup when its correo is free
#[derive(Clone)]
pub struct BootstrapAdmin {
    pub nombre: String,
    pub correo: String,
    pub password: String,
}

impl std::fmt::Debug for BootstrapAdmin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapAdmin")
            .field("nombre", &self.nombre)
            .field("correo", &self.correo)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` is missing
    /// - A numeric variable can't be parsed
    /// - Only some of the `BOOTSTRAP_ADMIN_*` credentials are set
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match var("API_PORT").or_else(|| var("PORT")) {
            Some(port) => parse_named("API_PORT", &port)?,
            None => 3000,
        };

        let cors_origins = var("CORS_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        let production = var("PRODUCTION").is_some_and(|v| parse_flag(&v));

        let url = var("DATABASE_URL")
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => parse_named("DATABASE_MAX_CONNECTIONS", &value)?,
            None => 10,
        };

        let idle_minutes = match var("SESSION_IDLE_MINUTES") {
            Some(value) => {
                let minutes: i64 = parse_named("SESSION_IDLE_MINUTES", &value)?;
                if !SESSION_IDLE_MINUTES_RANGE.contains(&minutes) {
                    anyhow::bail!(
                        "SESSION_IDLE_MINUTES must be between {} and {}, got {}",
                        SESSION_IDLE_MINUTES_RANGE.start(),
                        SESSION_IDLE_MINUTES_RANGE.end(),
                        minutes
                    );
                }
                Some(minutes)
            }
            None => None,
        };

        let upload_max_bytes = match var("UPLOAD_MAX_BYTES") {
            Some(value) => parse_named("UPLOAD_MAX_BYTES", &value)?,
            None => DEFAULT_UPLOAD_MAX_BYTES,
        };

        let bootstrap_admin = match (
            var("BOOTSTRAP_ADMIN_CORREO"),
            var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(correo), Some(password)) => Some(BootstrapAdmin {
                nombre: var("BOOTSTRAP_ADMIN_NOMBRE").unwrap_or_else(|| "Administrador".to_string()),
                correo,
                password,
            }),
            (None, None) => None,
            _ => anyhow::bail!(
                "BOOTSTRAP_ADMIN_CORREO and BOOTSTRAP_ADMIN_PASSWORD must be set together"
            ),
        };

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig {
                url,
                max_connections,
            },
            session: SessionConfig { idle_minutes },
            storage: StorageConfig {
                public_dir: PathBuf::from(var("PUBLIC_DIR").unwrap_or_else(|| "public".to_string())),
                upload_dir: PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string())),
                upload_max_bytes,
            },
            bootstrap_admin,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether any origin may call the API
    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|o| o == "*")
    }
}

fn parse_named<T>(key: &str, value: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| anyhow::anyhow!("Invalid value for {}: {} ({})", key, value, e))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
