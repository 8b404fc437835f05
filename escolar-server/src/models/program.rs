//! Program (carrera) records

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Column, Entity, FieldValue, Messages, Record, Table};
use super::payload::Payload;
use super::ValidationError;
use crate::db::DbError;

/// Program as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    #[serde(rename = "idCarrera")]
    pub id: i64,
    #[serde(rename = "carrera")]
    pub name: String,
    #[serde(rename = "descripcionCarrera")]
    pub description: String,
    #[serde(rename = "semestres")]
    pub term_count: i64,
    #[serde(rename = "plan")]
    pub plan_code: i64,
}

/// Validated create/replace input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramFields {
    pub name: String,
    pub description: String,
    pub term_count: i64,
    pub plan_code: i64,
}

impl Entity for Program {
    type Fields = ProgramFields;

    const TABLE: Table = Table {
        name: "carreras",
        id_column: "idCarrera",
        columns: &[
            Column::text("carrera"),
            Column::text("descripcionCarrera"),
            Column::integer("semestres"),
            Column::integer("plan"),
        ],
    };

    const MESSAGES: Messages = Messages {
        created: "Carrera creada exitosamente",
        updated: "Carrera actualizada exitosamente",
        deleted: "Carrera eliminada exitosamente",
        not_found: "Carrera no encontrada",
    };

    fn validate(payload: &Value) -> Result<ProgramFields, ValidationError> {
        let payload = Payload::require(payload, Self::TABLE.columns)?;

        let term_count = payload.integer("semestres")?;
        if term_count < 0 {
            return Err(ValidationError::InvalidFormat {
                field: "semestres",
                reason: "must not be negative",
            });
        }

        Ok(ProgramFields {
            name: payload.text("carrera")?,
            description: payload.text("descripcionCarrera")?,
            term_count,
            plan_code: payload.integer("plan")?,
        })
    }

    fn into_values(fields: ProgramFields) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(fields.name),
            FieldValue::Text(fields.description),
            FieldValue::Integer(fields.term_count),
            FieldValue::Integer(fields.plan_code),
        ]
    }

    fn decode(record: &Record) -> Result<Self, DbError> {
        Ok(Self {
            id: record.id,
            name: record.text("carrera")?,
            description: record.text("descripcionCarrera")?,
            term_count: record.integer("semestres")?,
            plan_code: record.integer("plan")?,
        })
    }
}
