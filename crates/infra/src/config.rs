//! Configuration loading from the process environment.
//!
//! Every loader has a `from_lookup` form that takes the variable lookup as a
//! closure, so tests can feed a fixed map instead of mutating the real
//! environment.

use std::net::SocketAddr;
use std::str::FromStr;

use sqlx::postgres::PgConnectOptions;
use thiserror::Error;

pub const DATABASE_HOSTNAME: &str = "DATABASE_HOSTNAME";
pub const DATABASE_PORT: &str = "DATABASE_PORT";
pub const DATABASE_NAME: &str = "DATABASE_NAME";
pub const DATABASE_USERNAME: &str = "DATABASE_USERNAME";
pub const DATABASE_PASSWORD: &str = "DATABASE_PASSWORD";

pub const BIND_ADDR: &str = "BIND_ADDR";
pub const DATABASE_MAX_CONNECTIONS: &str = "DATABASE_MAX_CONNECTIONS";
pub const POSTAPI_STORE: &str = "POSTAPI_STORE";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Configuration error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Reads `name` and parses it, falling back to `default` when unset.
pub(crate) fn parse_or<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).ok_or(ConfigError::Missing(name))
}

/// Connection settings for the posts database.
///
/// All five values are supplied externally; there are no defaults.
#[derive(Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub hostname: String,
    pub port: u16,
    pub name: String,
    pub username: String,
    password: String,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let hostname = required(&lookup, DATABASE_HOSTNAME)?;
        let port = parse_value(DATABASE_PORT, &required(&lookup, DATABASE_PORT)?)?;
        let name = required(&lookup, DATABASE_NAME)?;
        let username = required(&lookup, DATABASE_USERNAME)?;
        let password = required(&lookup, DATABASE_PASSWORD)?;

        Ok(Self {
            hostname,
            port,
            name,
            username,
            password,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.hostname)
            .port(self.port)
            .database(&self.name)
            .username(&self.username)
            .password(&self.password)
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("hostname", &self.hostname)
            .field("port", &self.port)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Which post store backs the HTTP API.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum StoreKind {
    #[default]
    Postgres,
    /// Process-local store for dev runs; nothing is persisted.
    Memory,
}

impl FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => Err(format!("expected `postgres` or `memory`, got `{other}`")),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub store: StoreKind,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bind_addr = match lookup(BIND_ADDR) {
            Some(raw) => parse_value(BIND_ADDR, &raw)?,
            None => parse_value(BIND_ADDR, DEFAULT_BIND_ADDR)?,
        };
        let max_connections = parse_or(&lookup, DATABASE_MAX_CONNECTIONS, DEFAULT_MAX_CONNECTIONS)?;
        if max_connections == 0 {
            return Err(ConfigError::Invalid {
                name: DATABASE_MAX_CONNECTIONS,
                reason: "must be at least 1".to_string(),
            });
        }
        let store = parse_or(&lookup, POSTAPI_STORE, StoreKind::default())?;

        Ok(Self {
            bind_addr,
            max_connections,
            store,
        })
    }
}
