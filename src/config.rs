use std::env;
use std::net::SocketAddr;

use anyhow::{anyhow, Context};

const DEFAULT_BIND: &str = "0.0.0.0:8000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKind {
    Postgres,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: SocketAddr,
    pub store: StoreKind,
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub apply_schema: bool,
}

impl Config {
    /// Reads `SURVEYS_*` variables from the environment (and `.env`, if the
    /// caller loaded it).
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let bind = var("SURVEYS_BIND").unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = bind.parse::<SocketAddr>()
            .with_context(|| format!("SURVEYS_BIND '{}' is not a valid socket address", bind))?;

        let store = match var("SURVEYS_STORE").as_deref() {
            None | Some("postgres") => StoreKind::Postgres,
            Some("memory") => StoreKind::Memory,
            Some(other) => return Err(anyhow!("SURVEYS_STORE must be 'postgres' or 'memory'; got '{}'", other)),
        };

        let database_url = var("SURVEYS_DATABASE_URL");
        if store == StoreKind::Postgres && database_url.is_none() {
            return Err(anyhow!("expected SURVEYS_DATABASE_URL"));
        }

        let max_connections = match var("SURVEYS_DB_MAX_CONNECTIONS") {
            None => DEFAULT_MAX_CONNECTIONS,
            Some(v) => match v.parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => return Err(anyhow!("SURVEYS_DB_MAX_CONNECTIONS must be a positive integer; got '{}'", v)),
            },
        };

        let apply_schema = match var("SURVEYS_APPLY_SCHEMA").as_deref() {
            None | Some("false") | Some("0") => false,
            Some("true") | Some("1") => true,
            Some(other) => return Err(anyhow!("SURVEYS_APPLY_SCHEMA must be true or false; got '{}'", other)),
        };

        Ok(Self {
            bind,
            store,
            database_url,
            max_connections,
            apply_schema,
        })
    }
}
