//! MySQL connection provisioning
//!
//! Uses a bounded sqlx MySqlPool with request-scoped checkout. The pool is
//! created lazily, so the server boots while the database is down and each
//! request reports [`Unavailable`] until it comes back.
//!
//! An idle pooled connection is reused directly. Otherwise one connect
//! attempt is made against the server address before the pool opens a
//! connection; a refused or unreachable server fails at once instead of
//! going through the pool's retry loop.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlArguments, MySqlPoolOptions, MySqlRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Connection, MySql, MySqlPool, Row};
use tokio::net::TcpStream;

use super::{DbError, Provisioner, StoreConnection, Unavailable};
use crate::config::{PoolSettings, StorageConfig};
use crate::models::{ColumnKind, FieldValue, Record, Table};

/// Create a MySQL pool without connecting.
///
/// # Example
///
/// ```ignore
/// let pool = create_pool(&config, PoolSettings::default());
/// ```
pub fn create_pool(config: &StorageConfig, settings: PoolSettings) -> MySqlPool {
    MySqlPoolOptions::new()
        .max_connections(settings.max_connections)
        .acquire_timeout(settings.acquire_timeout)
        .connect_lazy_with(config.connect_options())
}

/// Provisioner backed by a MySQL pool
///
/// # Example
///
/// ```ignore
/// let provisioner = MySqlProvisioner::new(&config, PoolSettings::default());
/// let mut conn = provisioner.acquire().await?;
/// ```
#[derive(Clone)]
pub struct MySqlProvisioner {
    pool: MySqlPool,
    host: String,
    port: u16,
    connect_timeout: Duration,
}

impl MySqlProvisioner {
    pub fn new(config: &StorageConfig, settings: PoolSettings) -> Self {
        Self {
            pool: create_pool(config, settings),
            host: config.host.clone(),
            port: config.port,
            connect_timeout: settings.acquire_timeout,
        }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// One connect attempt, no retries.
    async fn reach_server(&self) -> Result<(), Unavailable> {
        let address = (self.host.as_str(), self.port);
        match tokio::time::timeout(self.connect_timeout, TcpStream::connect(address)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(Unavailable {
                reason: format!("cannot reach {}:{}: {}", self.host, self.port, e),
            }),
            Err(_) => Err(Unavailable {
                reason: format!("timed out connecting to {}:{}", self.host, self.port),
            }),
        }
    }
}

#[async_trait]
impl Provisioner for MySqlProvisioner {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, Unavailable> {
        if let Some(conn) = self.pool.try_acquire() {
            return Ok(Box::new(PooledConnection { conn }));
        }

        self.reach_server().await?;

        match self.pool.acquire().await {
            Ok(conn) => Ok(Box::new(PooledConnection { conn })),
            Err(e) => Err(Unavailable {
                reason: e.to_string(),
            }),
        }
    }
}

/// A pool checkout; returned to the pool on drop.
struct PooledConnection {
    conn: PoolConnection<MySql>,
}

#[async_trait]
impl StoreConnection for PooledConnection {
    async fn ping(&mut self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&mut *self.conn).await?;
        Ok(())
    }

    async fn fetch_all(&mut self, table: &Table) -> Result<Vec<Record>, DbError> {
        let sql = select_sql(table);
        let rows = sqlx::query(&sql).fetch_all(&mut *self.conn).await?;

        rows.iter()
            .map(|row| record_from_row(table, row))
            .collect()
    }

    async fn fetch_one(&mut self, table: &Table, id: i64) -> Result<Option<Record>, DbError> {
        let sql = format!("{} WHERE {} = ?", select_sql(table), quote(table.id_column));
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await?;

        row.map(|row| record_from_row(table, &row)).transpose()
    }

    async fn insert(&mut self, table: &Table, values: &[FieldValue]) -> Result<i64, DbError> {
        let sql = insert_sql(table);

        let mut tx = self.conn.begin().await?;
        let result = bind_values(sqlx::query(&sql), values)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.last_insert_id() as i64)
    }

    async fn update(
        &mut self,
        table: &Table,
        id: i64,
        values: &[FieldValue],
    ) -> Result<u64, DbError> {
        let sql = update_sql(table);

        let mut tx = self.conn.begin().await?;
        let result = bind_values(sqlx::query(&sql), values)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }

    async fn delete(&mut self, table: &Table, id: i64) -> Result<u64, DbError> {
        let sql = format!(
            "DELETE FROM {} WHERE {} = ?",
            quote(table.name),
            quote(table.id_column)
        );

        let mut tx = self.conn.begin().await?;
        let result = sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
        tx.commit().await?;

        Ok(result.rows_affected())
    }
}

fn quote(identifier: &str) -> String {
    format!("`{}`", identifier)
}

/// Integer columns are cast so every integer width decodes as i64.
fn select_expr(name: &str, kind: ColumnKind) -> String {
    match kind {
        ColumnKind::Text => quote(name),
        ColumnKind::Integer => format!("CAST({0} AS SIGNED) AS {0}", quote(name)),
    }
}

fn select_sql(table: &Table) -> String {
    let columns: Vec<String> = std::iter::once(select_expr(table.id_column, ColumnKind::Integer))
        .chain(table.columns.iter().map(|c| select_expr(c.name, c.kind)))
        .collect();

    format!("SELECT {} FROM {}", columns.join(", "), quote(table.name))
}

fn insert_sql(table: &Table) -> String {
    let names: Vec<String> = table.columns.iter().map(|c| quote(c.name)).collect();
    let placeholders = vec!["?"; table.columns.len()].join(", ");

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote(table.name),
        names.join(", "),
        placeholders
    )
}

fn update_sql(table: &Table) -> String {
    let assignments: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} = ?", quote(c.name)))
        .collect();

    format!(
        "UPDATE {} SET {} WHERE {} = ?",
        quote(table.name),
        assignments.join(", "),
        quote(table.id_column)
    )
}

fn bind_values<'q>(
    mut query: Query<'q, MySql, MySqlArguments>,
    values: &'q [FieldValue],
) -> Query<'q, MySql, MySqlArguments> {
    for value in values {
        query = match value {
            FieldValue::Text(s) => query.bind(s.as_str()),
            FieldValue::Integer(n) => query.bind(*n),
        };
    }
    query
}

fn record_from_row(table: &Table, row: &MySqlRow) -> Result<Record, DbError> {
    let id: i64 = row.try_get(table.id_column)?;

    let mut fields = Vec::with_capacity(table.columns.len());
    for column in table.columns {
        let value = match column.kind {
            ColumnKind::Text => FieldValue::Text(row.try_get(column.name)?),
            ColumnKind::Integer => FieldValue::Integer(row.try_get(column.name)?),
        };
        fields.push((column.name, value));
    }

    Ok(Record { id, fields })
}
