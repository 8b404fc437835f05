//! Database connectivity check

use anyhow::{Context, Result};
use clap::Parser;

use escolar_server::db::{MySqlProvisioner, Provisioner};

use super::{DatabaseArgs, PoolArgs};

/// Arguments for the ping command
#[derive(Parser, Debug)]
pub struct PingArgs {
    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub pool: PoolArgs,
}

/// Check out one connection and run a trivial query.
pub async fn run_ping(args: PingArgs) -> Result<()> {
    let storage = args.database.storage_config()?;
    let provisioner = MySqlProvisioner::new(&storage, args.pool.settings());

    let mut conn = provisioner
        .acquire()
        .await
        .with_context(|| format!("Cannot connect to {}:{}", storage.host, storage.port))?;
    conn.ping().await.context("Connected, but the test query failed")?;

    println!(
        "ok: {}@{}:{}/{}",
        storage.user, storage.host, storage.port, storage.database
    );
    Ok(())
}
