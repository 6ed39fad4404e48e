use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use anyhow::{Context, Result};
use zeroize::Zeroizing;

/// Default maximum upload size (5 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// The application's configuration.
#[derive(Clone)]
pub struct Config {
    /// The address the HTTP server binds to.
    pub bind_addr: SocketAddr,
    /// The URL of the PostgreSQL database. Students live in memory when unset.
    pub database_url: Option<String>,
    /// The URL of the Redis server. Admin sessions live in memory when unset.
    pub redis_url: Option<String>,
    /// The lifetime of an admin session in hours.
    pub session_duration_hours: i64,
    /// The largest accepted import file, in bytes.
    pub max_upload_bytes: usize,
    /// Course assigned to imported rows without a course column.
    pub default_course: String,
    /// Batch assigned to imported rows without a batch column.
    pub default_batch: String,
    /// Username of the admin account created at startup.
    pub admin_username: String,
    /// Password of the admin account created at startup.
    pub admin_password: Zeroizing<String>,
    /// Whether the in-memory store starts with the sample roster.
    pub seed_sample_data: bool,
    /// Origins allowed by the CORS layer.
    pub cors_origins: Vec<String>,
    /// Directory with the compiled web client, served as the router fallback.
    pub public_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            database_url: None,
            redis_url: None,
            session_duration_hours: 24,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            default_course: "MCA".to_string(),
            default_batch: "2024-2026".to_string(),
            admin_username: "admin".to_string(),
            admin_password: Zeroizing::new("admin123".to_string()),
            seed_sample_data: true,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
                "http://[::1]:3000".to_string(),
            ],
            public_dir: "public".to_string(),
        }
    }
}

/// Reads an optional variable and parses it, falling back to `default` when unset.
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {}", name)),
        Err(_) => Ok(default),
    }
}

/// Reads an optional variable, treating an empty value as unset.
fn optional_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Creates a new `Config` from environment variables.
    ///
    /// Every variable is optional; unset variables keep the values of
    /// [`Config::default`].
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Config`.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let session_duration_hours =
            parse_var("SESSION_DURATION_HOURS", defaults.session_duration_hours)?;
        if session_duration_hours <= 0 {
            anyhow::bail!("SESSION_DURATION_HOURS must be positive");
        }

        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", defaults.max_upload_bytes)?;
        if max_upload_bytes == 0 {
            anyhow::bail!("MAX_UPLOAD_BYTES must be positive");
        }

        let cors_origins = match optional_var("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(|origin| origin.trim().to_string())
                .filter(|origin| !origin.is_empty())
                .collect(),
            None => defaults.cors_origins,
        };

        Ok(Self {
            bind_addr: parse_var("BIND_ADDR", defaults.bind_addr)?,
            database_url: optional_var("DATABASE_URL"),
            redis_url: optional_var("REDIS_URL"),
            session_duration_hours,
            max_upload_bytes,
            default_course: optional_var("DEFAULT_COURSE").unwrap_or(defaults.default_course),
            default_batch: optional_var("DEFAULT_BATCH").unwrap_or(defaults.default_batch),
            admin_username: optional_var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            admin_password: optional_var("ADMIN_PASSWORD")
                .map(Zeroizing::new)
                .unwrap_or(defaults.admin_password),
            seed_sample_data: parse_var("SEED_SAMPLE_DATA", defaults.seed_sample_data)?,
            cors_origins,
            public_dir: optional_var("PUBLIC_DIR").unwrap_or(defaults.public_dir),
        })
    }

    /// The admin session lifetime as a `chrono::Duration`.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_duration_hours)
    }
}
