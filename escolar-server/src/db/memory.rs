//! In-memory store
//!
//! A [`Provisioner`] that keeps tables in process memory. Used by
//! `escolar serve --in-memory` and by the router tests, which also rely on
//! its fault injection and connection accounting.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{DbError, Provisioner, StoreConnection, Unavailable};
use crate::models::{ColumnKind, FieldValue, Record, Table};

#[derive(Debug, Default)]
struct MemoryTable {
    last_id: i64,
    rows: BTreeMap<i64, Vec<FieldValue>>,
}

#[derive(Default)]
struct Inner {
    tables: Mutex<HashMap<&'static str, MemoryTable>>,
    unavailable: AtomicBool,
    query_failure: std::sync::Mutex<Option<String>>,
    open: AtomicUsize,
    acquired: AtomicUsize,
    queries: AtomicUsize,
}

/// Shared handle to an in-memory database
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `acquire` fail (or succeed again).
    pub fn set_available(&self, available: bool) {
        self.inner.unavailable.store(!available, Ordering::SeqCst);
    }

    /// Make every subsequent query fail with `message`; `None` clears it.
    pub fn fail_queries(&self, message: Option<&str>) {
        if let Ok(mut failure) = self.inner.query_failure.lock() {
            *failure = message.map(str::to_owned);
        }
    }

    /// Connections currently checked out
    pub fn open_connections(&self) -> usize {
        self.inner.open.load(Ordering::SeqCst)
    }

    /// Connections handed out since creation
    pub fn total_acquired(&self) -> usize {
        self.inner.acquired.load(Ordering::SeqCst)
    }

    /// Queries attempted since creation, including failed ones
    pub fn queries_executed(&self) -> usize {
        self.inner.queries.load(Ordering::SeqCst)
    }

    /// Number of rows currently stored in `table`.
    pub async fn row_count(&self, table: &Table) -> usize {
        self.inner
            .tables
            .lock()
            .await
            .get(table.name)
            .map_or(0, |t| t.rows.len())
    }
}

#[async_trait]
impl Provisioner for MemoryStore {
    async fn acquire(&self) -> Result<Box<dyn StoreConnection>, Unavailable> {
        if self.inner.unavailable.load(Ordering::SeqCst) {
            return Err(Unavailable {
                reason: "in-memory store marked unavailable".to_string(),
            });
        }

        self.inner.open.fetch_add(1, Ordering::SeqCst);
        self.inner.acquired.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            inner: Arc::clone(&self.inner),
        }))
    }
}

struct MemoryConnection {
    inner: Arc<Inner>,
}

impl Drop for MemoryConnection {
    fn drop(&mut self) {
        self.inner.open.fetch_sub(1, Ordering::SeqCst);
    }
}

impl MemoryConnection {
    /// Count the query and apply any injected failure.
    fn begin_query(&self) -> Result<(), DbError> {
        self.inner.queries.fetch_add(1, Ordering::SeqCst);

        let failure = self
            .inner
            .query_failure
            .lock()
            .map_err(|_| DbError::Backend("query failure flag poisoned".to_string()))?;
        match failure.as_ref() {
            Some(message) => Err(DbError::Backend(message.clone())),
            None => Ok(()),
        }
    }
}

/// Values must line up with the table's columns, as a real schema would enforce.
fn check_values(table: &Table, values: &[FieldValue]) -> Result<(), DbError> {
    if values.len() != table.columns.len() {
        return Err(DbError::Backend(format!(
            "column count doesn't match value count for table {}",
            table.name
        )));
    }

    for (column, value) in table.columns.iter().zip(values) {
        let matches = matches!(
            (column.kind, value),
            (ColumnKind::Text, FieldValue::Text(_)) | (ColumnKind::Integer, FieldValue::Integer(_))
        );
        if !matches {
            return Err(DbError::Backend(format!(
                "incorrect value for column '{}'",
                column.name
            )));
        }
    }

    Ok(())
}

fn to_record(table: &Table, id: i64, values: &[FieldValue]) -> Record {
    Record {
        id,
        fields: table
            .columns
            .iter()
            .map(|c| c.name)
            .zip(values.iter().cloned())
            .collect(),
    }
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn ping(&mut self) -> Result<(), DbError> {
        self.begin_query()
    }

    async fn fetch_all(&mut self, table: &Table) -> Result<Vec<Record>, DbError> {
        self.begin_query()?;
        let tables = self.inner.tables.lock().await;

        Ok(tables
            .get(table.name)
            .map(|t| {
                t.rows
                    .iter()
                    .map(|(id, values)| to_record(table, *id, values))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn fetch_one(&mut self, table: &Table, id: i64) -> Result<Option<Record>, DbError> {
        self.begin_query()?;
        let tables = self.inner.tables.lock().await;

        Ok(tables
            .get(table.name)
            .and_then(|t| t.rows.get(&id))
            .map(|values| to_record(table, id, values)))
    }

    async fn insert(&mut self, table: &Table, values: &[FieldValue]) -> Result<i64, DbError> {
        self.begin_query()?;
        check_values(table, values)?;

        let mut tables = self.inner.tables.lock().await;
        let t = tables.entry(table.name).or_default();
        t.last_id += 1;
        t.rows.insert(t.last_id, values.to_vec());

        Ok(t.last_id)
    }

    async fn update(
        &mut self,
        table: &Table,
        id: i64,
        values: &[FieldValue],
    ) -> Result<u64, DbError> {
        self.begin_query()?;
        check_values(table, values)?;

        let mut tables = self.inner.tables.lock().await;
        match tables.get_mut(table.name).and_then(|t| t.rows.get_mut(&id)) {
            Some(row) => {
                *row = values.to_vec();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&mut self, table: &Table, id: i64) -> Result<u64, DbError> {
        self.begin_query()?;

        let mut tables = self.inner.tables.lock().await;
        let removed = tables
            .get_mut(table.name)
            .and_then(|t| t.rows.remove(&id))
            .is_some();

        Ok(u64::from(removed))
    }
}
