//! Runtime configuration, read from environment variables.
//!
//! | variable          | default                        |
//! |-------------------|--------------------------------|
//! | `TICKETS_DB_PATH` | `tickets.db`                   |
//! | `TICKETS_HOST`    | `127.0.0.1`                    |
//! | `TICKETS_PORT`    | `3000`                         |
//! | `RUST_LOG`        | `info,ticket_lifecycle=debug`  |
use anyhow::Context;
use std::path::PathBuf;

pub const DEFAULT_LOG_FILTER: &str = "info,ticket_lifecycle=debug";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_filter: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("TICKETS_PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("TICKETS_PORT is not a valid port: {raw:?}"))?,
            None => 3000,
        };

        Ok(Self {
            db_path: lookup("TICKETS_DB_PATH")
                .unwrap_or_else(|| "tickets.db".into())
                .into(),
            host: lookup("TICKETS_HOST").unwrap_or_else(|| "127.0.0.1".into()),
            port,
            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.into()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
