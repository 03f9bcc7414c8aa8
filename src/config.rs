use crate::error::{
    BadEnvVarSnafu, InvalidApiBaseSnafu, ParseMaxConnectionsSnafu, RosterResult,
};
use dotenvy::var;
use snafu::{ResultExt, ensure};
use std::{env::VarError, sync::Arc};

const DEFAULT_DATABASE_URL: &str = "sqlite://student_registration.db";
const DEFAULT_MAX_CONNECTIONS: &str = "5";
const DEFAULT_SERVER_IP: &str = "0.0.0.0:3001";
const DEFAULT_API_BASE: &str = "/api";

fn env_or(name: &'static str, default: &str) -> RosterResult<String> {
    match var(name) {
        Err(dotenvy::Error::EnvVar(VarError::NotPresent)) => Ok(default.to_string()),
        other => other.context(BadEnvVarSnafu { name }),
    }
}

#[derive(Clone, Debug)]
pub struct RuntimeConfiguration {
    db_config: Arc<DbConfig>,
    server_ip: String,
    api_base: String,
}

impl RuntimeConfiguration {
    pub fn new() -> RosterResult<Self> {
        Self::from_parts(
            DbConfig::new()?,
            env_or("ROSTER_SERVER_IP", DEFAULT_SERVER_IP)?,
            &env_or("ROSTER_API_BASE", DEFAULT_API_BASE)?,
        )
    }

    pub fn from_parts(db_config: DbConfig, server_ip: String, api_base: &str) -> RosterResult<Self> {
        Ok(Self {
            db_config: Arc::new(db_config),
            server_ip,
            api_base: normalise_api_base(api_base)?,
        })
    }

    pub fn db_config(&self) -> Arc<DbConfig> {
        self.db_config.clone()
    }

    pub fn server_ip(&self) -> &str {
        &self.server_ip
    }

    /// Prefix the REST routes are mounted under. Empty means the routes sit at the root.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }
}

/// Strips trailing slashes, so `/api/` and `/api` mount identically and `/` becomes the root.
fn normalise_api_base(base: &str) -> RosterResult<String> {
    let base = base.trim();
    ensure!(
        base.starts_with('/'),
        InvalidApiBaseSnafu {
            base: base.to_string()
        }
    );
    Ok(base.trim_end_matches('/').to_string())
}

#[derive(Debug)]
pub struct DbConfig {
    url: String,
    max_connections: u32,
}

impl DbConfig {
    pub fn new() -> RosterResult<Self> {
        let url = env_or("ROSTER_DATABASE_URL", DEFAULT_DATABASE_URL)?;
        let max_connections = env_or("ROSTER_DB_MAX_CONNECTIONS", DEFAULT_MAX_CONNECTIONS)?;
        let max_connections = max_connections
            .trim()
            .parse()
            .context(ParseMaxConnectionsSnafu {
                original: max_connections.clone(),
            })?;

        Ok(Self::with_url(url, max_connections))
    }

    pub const fn with_url(url: String, max_connections: u32) -> Self {
        Self {
            url,
            max_connections,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Every connection to an in-memory SQLite database gets a database of its own.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    /// Pool size; pinned to one for in-memory databases so every request sees the same store.
    pub fn max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections
        }
    }
}
