//! Domain models with validation at construction
//!
//! All user input is validated before it reaches storage.
//! Invalid input returns ValidationError, not panic.

pub mod entity;
pub mod payload;
pub mod program;
pub mod student;
pub mod validation;

pub use entity::{Column, ColumnKind, Entity, FieldValue, Messages, Record, Table};
pub use payload::{coerce_integer, parse_body, Payload};
pub use program::{Program, ProgramFields};
pub use student::{Student, StudentFields};
pub use validation::ValidationError;
