//! escolar-server: HTTP service for programs (carreras) and students (alumnos)
//!
//! Validates and coerces JSON payloads, persists them through a per-request
//! storage connection and maps every outcome onto a status code and a
//! `{"message"}` / `{"error"}` body.

pub mod config;
pub mod db;
pub mod http;
pub mod models;
pub mod state;

pub use config::{PoolSettings, StorageConfig};
pub use db::{MemoryStore, MySqlProvisioner, Provisioner};
pub use http::{build_router, run_server, ServerConfig};
pub use state::AppState;
