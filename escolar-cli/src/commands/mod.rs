//! Subcommands and the arguments they share

pub mod ping;
pub mod serve;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use escolar_server::config::DEFAULT_PORT;
use escolar_server::{PoolSettings, StorageConfig};

/// MySQL connection arguments (read from the environment or `.env`)
#[derive(Args, Debug)]
pub struct DatabaseArgs {
    /// Database host
    #[arg(long, env = "DB_HOST", default_value = "localhost")]
    pub db_host: String,

    /// Database port
    #[arg(long, env = "DB_PORT", default_value_t = DEFAULT_PORT)]
    pub db_port: u16,

    /// Database user
    #[arg(long, env = "DB_USER")]
    pub db_user: Option<String>,

    /// Database password
    #[arg(long, env = "DB_PASSWORD", hide_env_values = true)]
    pub db_password: Option<String>,

    /// Database name
    #[arg(long, env = "DB_NAME")]
    pub db_name: Option<String>,
}

impl DatabaseArgs {
    pub fn storage_config(&self) -> Result<StorageConfig> {
        let user = self
            .db_user
            .clone()
            .context("DB_USER not set. Set via --db-user, DB_USER env, or .env")?;
        let database = self
            .db_name
            .clone()
            .context("DB_NAME not set. Set via --db-name, DB_NAME env, or .env")?;

        Ok(StorageConfig {
            host: self.db_host.clone(),
            port: self.db_port,
            user,
            password: self.db_password.clone().unwrap_or_default(),
            database,
        })
    }
}

/// Connection pool arguments
#[derive(Args, Debug)]
pub struct PoolArgs {
    /// Maximum pooled connections
    #[arg(long, default_value_t = 10)]
    pub max_connections: u32,

    /// Seconds a request waits for a connection before answering 500
    #[arg(long, default_value_t = 5)]
    pub acquire_timeout: u64,
}

impl PoolArgs {
    pub fn settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.max_connections,
            acquire_timeout: Duration::from_secs(self.acquire_timeout),
        }
    }
}
