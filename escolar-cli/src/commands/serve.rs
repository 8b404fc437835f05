//! HTTP server command
//!
//! Runs the escolar HTTP server against MySQL, or against a throwaway
//! in-memory store with `--in-memory`.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use escolar_server::db::{MemoryStore, MySqlProvisioner};
use escolar_server::http::{run_server, ServerConfig};
use escolar_server::AppState;

use super::{DatabaseArgs, PoolArgs};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to
    #[arg(long, short = 'b', env = "ESCOLAR_BIND", default_value = "127.0.0.1:5000")]
    pub bind: SocketAddr,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Replace raw storage error text in 500 responses with a generic message
    #[arg(long)]
    pub redact_errors: bool,

    /// Serve from an in-memory store instead of MySQL (data is lost on exit)
    #[arg(long)]
    pub in_memory: bool,

    #[command(flatten)]
    pub database: DatabaseArgs,

    #[command(flatten)]
    pub pool: PoolArgs,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let state = if args.in_memory {
        tracing::warn!("Serving from in-memory store; nothing is persisted");
        AppState::new(MemoryStore::new(), args.redact_errors)
    } else {
        let storage = args.database.storage_config()?;
        tracing::info!(?storage, "Using MySQL storage");

        // Lazy pool: requests answer 500 until the database is reachable
        let provisioner = MySqlProvisioner::new(&storage, args.pool.settings());
        AppState::new(provisioner, args.redact_errors)
    };

    tracing::info!("Starting escolar server on {}", args.bind);

    let config = ServerConfig {
        bind_addr: args.bind,
        cors_permissive: args.cors_permissive,
    };

    // Run server (blocks until shutdown)
    run_server(state, config).await.context("Server error")?;

    Ok(())
}
