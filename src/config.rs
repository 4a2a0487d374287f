use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use dotenvy::dotenv;

#[derive(Clone, Debug)]
pub struct Config {
    pub server_addr: String,
    pub store_path: PathBuf,
    pub api_prefix: String,

    // Logging
    pub log_dir: String,
    pub log_level: tracing::Level,

    pub migration_dry_run: bool,

    // Rate limiting
    pub rate_read_per_min: u32,
    pub rate_migrate_per_min: u32,

    pub record_cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_addr: "127.0.0.1:8080".to_string(),
            store_path: PathBuf::from("data/local_storage.json"),
            api_prefix: "/api".to_string(),
            log_dir: "logs".to_string(),
            log_level: tracing::Level::DEBUG,
            migration_dry_run: false,
            rate_read_per_min: 600,
            rate_migrate_per_min: 6,
            record_cache_ttl_secs: 30,
        }
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} has an invalid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();
        let defaults = Self::default();

        Ok(Self {
            server_addr: env_or("SERVER_ADDR", defaults.server_addr)?,
            store_path: env_or("STORE_PATH", defaults.store_path)?,
            api_prefix: env_or("API_PREFIX", defaults.api_prefix)?,
            log_dir: env_or("LOG_DIR", defaults.log_dir)?,
            log_level: env_or("LOG_LEVEL", defaults.log_level)?,
            migration_dry_run: env_or("MIGRATION_DRY_RUN", defaults.migration_dry_run)?,
            rate_read_per_min: env_or("RATE_READ_PER_MIN", defaults.rate_read_per_min)?,
            rate_migrate_per_min: env_or("RATE_MIGRATE_PER_MIN", defaults.rate_migrate_per_min)?,
            record_cache_ttl_secs: env_or(
                "RECORD_CACHE_TTL_SECS",
                defaults.record_cache_ttl_secs,
            )?,
        })
    }
}
