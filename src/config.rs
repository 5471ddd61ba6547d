use std::env;

use crate::shared::AppError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Address the HTTP listener binds to
    pub bind_addr: String,

    /// PostgreSQL connection string; the in-memory store is used when absent
    pub database_url: Option<String>,

    /// Maximum number of pooled database connections
    pub db_max_connections: u32,
}

impl AppConfig {
    /// Reads configuration from the process environment
    ///
    /// - `BIND_ADDR` (default `0.0.0.0:3000`)
    /// - `DATABASE_URL` (optional)
    /// - `DB_MAX_CONNECTIONS` (default 5)
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let non_blank = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_max_connections = match non_blank("DB_MAX_CONNECTIONS") {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| {
                AppError::InvalidArgument(format!(
                    "DB_MAX_CONNECTIONS must be a positive integer, got {}",
                    raw
                ))
            })?,
            None => DEFAULT_DB_MAX_CONNECTIONS,
        };
        if db_max_connections == 0 {
            return Err(AppError::InvalidArgument(
                "DB_MAX_CONNECTIONS must be a positive integer, got 0".to_string(),
            ));
        }

        Ok(Self {
            bind_addr: non_blank("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url: non_blank("DATABASE_URL"),
            db_max_connections,
        })
    }
}
