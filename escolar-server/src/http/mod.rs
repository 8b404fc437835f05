//! HTTP server layer
//!
//! Axum server with:
//! - One generic resource handler per entity type
//! - JSON error responses
//! - Request tracing, CORS and graceful shutdown

pub mod error;
pub mod extractors;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use server::{build_router, run_server, ServerConfig, ServerError};
