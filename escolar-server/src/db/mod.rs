//! Database layer - connection provisioning and storage access
//!
//! # Design Principles
//!
//! - One connection checked out per request, returned when the handle drops
//! - Unavailability is a value ([`Unavailable`]), never a panic
//! - Writes are single statements committed immediately
//! - Only declared columns are read; rows are projected into [`Record`]s

pub mod memory;
pub mod pool;

use async_trait::async_trait;

use crate::models::{FieldValue, Record, Table};

pub use memory::MemoryStore;
pub use pool::{create_pool, MySqlProvisioner};

/// Storage failure while executing a query or decoding its result
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error("column `{column}` does not hold {expected}")]
    Decode {
        column: &'static str,
        expected: &'static str,
    },

    #[error("{0}")]
    Backend(String),
}

/// Storage could not be reached
#[derive(Debug, thiserror::Error)]
#[error("storage unavailable: {reason}")]
pub struct Unavailable {
    pub reason: String,
}

/// A checked-out storage connection.
///
/// Dropping the handle releases the connection.
#[async_trait]
pub trait StoreConnection: Send {
    /// Round-trip a trivial query.
    async fn ping(&mut self) -> Result<(), DbError>;

    /// All rows of a table, in storage order.
    async fn fetch_all(&mut self, table: &Table) -> Result<Vec<Record>, DbError>;

    /// The row with the given identifier, if any.
    async fn fetch_one(&mut self, table: &Table, id: i64) -> Result<Option<Record>, DbError>;

    /// Insert a row and commit. Returns the generated identifier.
    async fn insert(&mut self, table: &Table, values: &[FieldValue]) -> Result<i64, DbError>;

    /// Overwrite every mutable column and commit. Returns rows affected.
    async fn update(&mut self, table: &Table, id: i64, values: &[FieldValue])
        -> Result<u64, DbError>;

    /// Delete by identifier and commit. Returns rows affected.
    async fn delete(&mut self, table: &Table, id: i64) -> Result<u64, DbError>;
}

/// Hands out one connection per request (testable)
#[async_trait]
pub trait Provisioner: Send + Sync {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, Unavailable>;
}
