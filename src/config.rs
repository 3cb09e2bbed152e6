//! Runtime configuration.
//!
//! Values come from CLI flags first, then environment variables, then
//! defaults:
//!
//! - `NESTWELL_DB_PATH`: SQLite file (default: platform data dir)
//! - `NESTWELL_BIND`: listen address (default `127.0.0.1`)
//! - `NESTWELL_PORT`: listen port (default `3000`)
//! - `NESTWELL_CORS_ORIGINS`: comma-separated origins, or `*` for any
//!   (default: localhost only)

use std::path::PathBuf;

use anyhow::{Context, Result};
use nestwell_core::Database;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
    LocalhostOnly,
}

impl CorsOrigins {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") => Self::LocalhostOnly,
            Some("*") => Self::Any,
            Some(list) => {
                let origins: Vec<String> = list
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect();
                if origins.is_empty() {
                    Self::LocalhostOnly
                } else {
                    Self::List(origins)
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub bind: String,
    pub port: u16,
    pub cors: CorsOrigins,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let db_path = match lookup("NESTWELL_DB_PATH").filter(|p| !p.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => Database::default_path()?,
        };
        let port = match lookup("NESTWELL_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("NESTWELL_PORT is not a valid port: {}", raw))?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            db_path,
            bind: lookup("NESTWELL_BIND").unwrap_or_else(|| DEFAULT_BIND.to_string()),
            port,
            cors: CorsOrigins::parse(lookup("NESTWELL_CORS_ORIGINS").as_deref()),
        })
    }

    /// Applies CLI flags over the environment-derived values.
    pub fn with_overrides(mut self, port: Option<u16>, db_path: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(path) = db_path {
            self.db_path = path;
        }
        self
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
