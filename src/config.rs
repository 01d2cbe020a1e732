use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use dotenvy::dotenv;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub server_addr: String,

    // Rate limiting
    pub rate_protected_per_min: u32,

    pub api_prefix: String,

    // Holiday calendar cache
    pub holiday_cache_ttl_secs: u64,
    pub holiday_cache_capacity: u64,

    pub log_dir: String,
    pub run_migrations: bool,
}

fn required(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{} must be set", key))
}

fn parsed_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        Self::from_env_only()
    }

    /// Reads the process environment without touching `.env`.
    pub fn from_env_only() -> Result<Self> {
        Ok(Self {
            server_addr: required("SERVER_ADDR")?,
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,

            rate_protected_per_min: parsed_or("RATE_PROTECTED_PER_MIN", 1000)?,

            api_prefix: env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),

            holiday_cache_ttl_secs: parsed_or("HOLIDAY_CACHE_TTL_SECS", 86400)?, // 24h
            holiday_cache_capacity: parsed_or("HOLIDAY_CACHE_CAPACITY", 64)?,

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
            run_migrations: parsed_or("RUN_MIGRATIONS", true)?,
        })
    }

    pub fn holiday_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.holiday_cache_ttl_secs)
    }
}
