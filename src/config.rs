use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::domain::seats::SeatPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Which document store backs the service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub bind_addr: SocketAddr,
    pub log_dir: PathBuf,
    pub request_timeout: Duration,
    pub profile_cache_ttl: Duration,
    pub seat_policy: SeatPolicy,
}

impl Config {
    /// ✅ Load environment variables and set defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let store_backend = parse_var("STORE_BACKEND", StoreBackend::Memory)?;
        let database_url = env::var("DATABASE_URL").ok().filter(|url| !url.is_empty());
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        Ok(Self {
            store_backend,
            database_url,
            jwt_secret: env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?,
            bind_addr: parse_var("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            log_dir: PathBuf::from(env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string())),
            request_timeout: Duration::from_secs(parse_var("REQUEST_TIMEOUT_SECS", 30u64)?),
            profile_cache_ttl: Duration::from_secs(parse_var("PROFILE_CACHE_TTL_SECS", 60u64)?),
            seat_policy: parse_var("SEAT_POLICY", SeatPolicy::default())?,
        })
    }

    /// In-memory configuration with the given secret, used by tests and local runs.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            jwt_secret: jwt_secret.into(),
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            log_dir: PathBuf::from("logs"),
            request_timeout: Duration::from_secs(30),
            profile_cache_ttl: Duration::from_secs(60),
            seat_policy: SeatPolicy::default(),
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value: raw }),
        _ => Ok(default),
    }
}
