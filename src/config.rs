// src/config.rs
use std::net::SocketAddr;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Runtime settings, read from the environment (and `.env`) at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub database_path: String,
    pub bind_addr: SocketAddr,
    pub max_workers: usize,
    pub page_size: i64,
    /// Writes allowed per user per window.
    pub rate_limit_max: i64,
    pub rate_limit_window_secs: i64,
    pub import_max_rows: usize,
    pub magic_link_ttl_secs: i64,
    pub session_ttl_secs: i64,
    pub seed_demo_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "buyer_leads.sqlite3".to_string(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            max_workers: 8,
            page_size: 10,
            rate_limit_max: 10,
            rate_limit_window_secs: 60,
            import_max_rows: 200,
            magic_link_ttl_secs: 15 * 60,
            session_ttl_secs: 60 * 60 * 24 * 7,
            seed_demo_data: false,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is fine.
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; unset keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let cfg = Self {
            database_path: lookup("DATABASE_PATH").unwrap_or(d.database_path),
            bind_addr: parsed(&lookup, "BIND_ADDR", d.bind_addr)?,
            max_workers: positive(&lookup, "MAX_WORKERS", d.max_workers)?,
            page_size: positive(&lookup, "PAGE_SIZE", d.page_size)?,
            rate_limit_max: positive(&lookup, "RATE_LIMIT_MAX", d.rate_limit_max)?,
            rate_limit_window_secs: positive(&lookup, "RATE_LIMIT_WINDOW_SECS", d.rate_limit_window_secs)?,
            import_max_rows: positive(&lookup, "IMPORT_MAX_ROWS", d.import_max_rows)?,
            magic_link_ttl_secs: positive(&lookup, "MAGIC_LINK_TTL_SECS", d.magic_link_ttl_secs)?,
            session_ttl_secs: positive(&lookup, "SESSION_TTL_SECS", d.session_ttl_secs)?,
            seed_demo_data: flag(&lookup, "SEED_DEMO_DATA", d.seed_demo_data)?,
        };
        Ok(cfg)
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn positive<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Default,
    T::Err: std::fmt::Display,
{
    let value = parsed(lookup, key, default)?;
    if value <= T::default() {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(value)
}

fn flag<F>(lookup: &F, key: &str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("expected true or false, got '{v}'"),
            }),
        },
    }
}
