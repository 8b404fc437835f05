//! Student (alumno) records
//!
//! `carrera` holds the program name as free text; it is not checked against
//! the programs table.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::entity::{Column, Entity, FieldValue, Messages, Record, Table};
use super::payload::Payload;
use super::ValidationError;
use crate::db::DbError;

/// Student as sent over the wire
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    #[serde(rename = "idAlumno")]
    pub id: i64,
    #[serde(rename = "nombre")]
    pub full_name: String,
    #[serde(rename = "carrera")]
    pub program: String,
    #[serde(rename = "semestre")]
    pub term: i64,
    #[serde(rename = "boleta")]
    pub enrollment: String,
}

/// Validated create/replace input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFields {
    pub full_name: String,
    pub program: String,
    pub term: i64,
    pub enrollment: String,
}

impl Entity for Student {
    type Fields = StudentFields;

    const TABLE: Table = Table {
        name: "alumnos",
        id_column: "idAlumno",
        columns: &[
            Column::text("nombre"),
            Column::text("carrera"),
            Column::integer("semestre"),
            Column::text("boleta"),
        ],
    };

    const MESSAGES: Messages = Messages {
        created: "Alumno creado exitosamente",
        updated: "Alumno actualizado exitosamente",
        deleted: "Alumno eliminado exitosamente",
        not_found: "Alumno no encontrado",
    };

    fn validate(payload: &Value) -> Result<StudentFields, ValidationError> {
        let payload = Payload::require(payload, Self::TABLE.columns)?;

        Ok(StudentFields {
            full_name: payload.text("nombre")?,
            program: payload.text("carrera")?,
            term: payload.integer("semestre")?,
            enrollment: payload.text("boleta")?,
        })
    }

    fn into_values(fields: StudentFields) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(fields.full_name),
            FieldValue::Text(fields.program),
            FieldValue::Integer(fields.term),
            FieldValue::Text(fields.enrollment),
        ]
    }

    fn decode(record: &Record) -> Result<Self, DbError> {
        Ok(Self {
            id: record.id,
            full_name: record.text("nombre")?,
            program: record.text("carrera")?,
            term: record.integer("semestre")?,
            enrollment: record.text("boleta")?,
        })
    }
}
