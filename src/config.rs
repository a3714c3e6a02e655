use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::error::AppError;

/// Server configuration read from `HOST`, `PORT`, `DATABASE_URL`,
/// `DB_MAX_CONNECTIONS` and `SNAPSHOT_PATH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub host: IpAddr,
    pub port: u16,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub snapshot_path: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            database_url: None,
            max_connections: 5,
            snapshot_path: None,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let host = match lookup("HOST") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("HOST is not an IP address: {}", raw)))?,
            None => defaults.host,
        };

        let port = match lookup("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| AppError::Config(format!("PORT must be a valid u16: {}", raw)))?,
            None => defaults.port,
        };

        let max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(AppError::Config(format!(
                        "DB_MAX_CONNECTIONS must be a positive integer: {}",
                        raw
                    )));
                }
            },
            None => defaults.max_connections,
        };

        let database_url = lookup("DATABASE_URL").filter(|url| !url.trim().is_empty());
        let snapshot_path = lookup("SNAPSHOT_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            host,
            port,
            database_url,
            max_connections,
            snapshot_path,
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
