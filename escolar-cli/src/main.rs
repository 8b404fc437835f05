//! escolar CLI - programs and students record service
//!
//! Entry point for the `escolar` binary:
//! - `serve`: run the HTTP API (`/carreras`, `/alumnos`)
//! - `ping`: check database connectivity with the configured settings
//!
//! Database settings come from flags or from `DB_HOST`, `DB_PORT`,
//! `DB_USER`, `DB_PASSWORD` and `DB_NAME` (a `.env` file is honored).

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod tracing_setup;

use tracing_setup::{init_tracing, TracingConfig};

#[derive(Parser, Debug)]
#[command(
    name = "escolar",
    author,
    version,
    about = "HTTP API for academic programs (carreras) and students (alumnos)"
)]
struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Check that the database is reachable
    Ping(commands::ping::PingArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&TracingConfig { debug: cli.debug })?;

    match cli.command {
        Commands::Serve(args) => commands::serve::run_serve(args).await,
        Commands::Ping(args) => commands::ping::run_ping(args).await,
    }
}
