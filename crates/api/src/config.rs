use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;

use folio_db::DatabaseConfig;
use sqlx::postgres::PgConnectOptions;

/// Minimum length of `SESSION_SECRET` in bytes.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

/// A required setting is missing or could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`). Must be an IP literal.
    pub host: IpAddr,
    /// Bind port (default: `5000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted request body, which bounds image uploads.
    pub max_upload_bytes: usize,
    /// HMAC key for signing the session cookie.
    pub session_secret: String,
    /// Directory holding the HTML templates.
    pub template_dir: PathBuf,
    /// Directory served under `/assets`.
    pub assets_dir: PathBuf,
    /// Directory uploads are written to and served from under `/upload`.
    pub upload_dir: PathBuf,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// | Env Var                | Default      |
    /// |------------------------|--------------|
    /// | `HOST` (IP literal)    | `127.0.0.1`  |
    /// | `PORT`                 | `5000`       |
    /// | `REQUEST_TIMEOUT_SECS` | `30`         |
    /// | `MAX_UPLOAD_BYTES`     | `10485760`   |
    /// | `SESSION_SECRET`       | **required** |
    /// | `TEMPLATE_DIR`         | `templates`  |
    /// | `ASSETS_DIR`           | `assets`     |
    /// | `UPLOAD_DIR`           | `upload`     |
    /// | `DB_MAX_CONNECTIONS`   | `10`         |
    ///
    /// The database is taken from `DATABASE_URL` when set, otherwise from
    /// `DB_HOST`, `DB_PORT` (default `5432`), `DB_USER`, `DB_PASSWORD` and
    /// `DB_NAME`, all required.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = parse_or(&lookup, "HOST", IpAddr::V4(Ipv4Addr::LOCALHOST))?;
        let port = parse_or(&lookup, "PORT", 5000u16)?;
        let request_timeout_secs = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30u64)?;
        let max_upload_bytes = parse_or(&lookup, "MAX_UPLOAD_BYTES", 10 * 1024 * 1024usize)?;

        let session_secret = required(&lookup, "SESSION_SECRET")?;
        if session_secret.len() < MIN_SESSION_SECRET_LEN {
            return Err(ConfigError::Invalid {
                name: "SESSION_SECRET",
                reason: format!("must be at least {MIN_SESSION_SECRET_LEN} bytes"),
            });
        }

        let template_dir = lookup("TEMPLATE_DIR").unwrap_or_else(|| "templates".into());
        let assets_dir = lookup("ASSETS_DIR").unwrap_or_else(|| "assets".into());
        let upload_dir = lookup("UPLOAD_DIR").unwrap_or_else(|| "upload".into());

        let database = DatabaseConfig {
            connect: connect_options(&lookup)?,
            max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 10u32)?,
        };

        Ok(Self {
            host,
            port,
            request_timeout_secs,
            max_upload_bytes,
            session_secret,
            template_dir: template_dir.into(),
            assets_dir: assets_dir.into(),
            upload_dir: upload_dir.into(),
            database,
        })
    }
}

/// Resolve database connection options from `DATABASE_URL` or the discrete `DB_*` vars.
fn connect_options<F>(lookup: &F) -> Result<PgConnectOptions, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        return PgConnectOptions::from_str(&url).map_err(|e| ConfigError::Invalid {
            name: "DATABASE_URL",
            reason: e.to_string(),
        });
    }

    let host = required(lookup, "DB_HOST")?;
    let port = parse_or(lookup, "DB_PORT", 5432u16)?;
    let user = required(lookup, "DB_USER")?;
    let password = required(lookup, "DB_PASSWORD")?;
    let database = required(lookup, "DB_NAME")?;

    Ok(PgConnectOptions::new()
        .host(&host)
        .port(port)
        .username(&user)
        .password(&password)
        .database(&database))
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}
