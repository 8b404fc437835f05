//! Entity descriptors
//!
//! Programs and students are served by the same handlers. Everything that
//! differs between them (table, columns, messages, codec) lives behind the
//! [`Entity`] trait.

use serde::Serialize;
use serde_json::Value;

use super::ValidationError;
use crate::db::DbError;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
}

/// A mutable column. The column name doubles as the JSON key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub name: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Text,
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self {
            name,
            kind: ColumnKind::Integer,
        }
    }
}

/// Table layout for one entity type
#[derive(Debug, Clone, Copy)]
pub struct Table {
    /// Table name, also the collection path segment
    pub name: &'static str,
    /// Generated primary key column
    pub id_column: &'static str,
    /// Mutable columns in insert/update order
    pub columns: &'static [Column],
}

/// A value bound to, or read from, a column
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
}

/// A storage row projected onto a [`Table`]'s declared columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: i64,
    pub fields: Vec<(&'static str, FieldValue)>,
}

impl Record {
    fn get(&self, column: &'static str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(name, _)| *name == column)
            .map(|(_, value)| value)
    }

    pub fn text(&self, column: &'static str) -> Result<String, DbError> {
        match self.get(column) {
            Some(FieldValue::Text(s)) => Ok(s.clone()),
            _ => Err(DbError::Decode {
                column,
                expected: "text",
            }),
        }
    }

    pub fn integer(&self, column: &'static str) -> Result<i64, DbError> {
        match self.get(column) {
            Some(FieldValue::Integer(n)) => Ok(*n),
            _ => Err(DbError::Decode {
                column,
                expected: "integer",
            }),
        }
    }
}

/// User-facing messages for one entity type
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub created: &'static str,
    pub updated: &'static str,
    pub deleted: &'static str,
    pub not_found: &'static str,
}

/// A record type served over a collection and an item endpoint.
pub trait Entity: Serialize + Send + Sync + Sized + 'static {
    /// Validated, storage-ready input for create and replace
    type Fields: Send;

    const TABLE: Table;
    const MESSAGES: Messages;

    /// Check presence of every required field, then coerce.
    fn validate(payload: &Value) -> Result<Self::Fields, ValidationError>;

    /// Values in [`Table::columns`] order.
    fn into_values(fields: Self::Fields) -> Vec<FieldValue>;

    /// Project a storage record onto the wire type.
    fn decode(record: &Record) -> Result<Self, DbError>;
}
