//! Loosely-typed JSON payloads and integer coercion
//!
//! Request bodies arrive as arbitrary JSON. Presence of every required key
//! is checked first; only a complete payload is handed out for coercion.

use serde_json::{Map, Value};

use super::entity::Column;
use super::ValidationError;

/// Parse a raw request body.
///
/// An empty (or whitespace-only) body is treated as JSON `null`, which then
/// fails the presence check like any other payload without keys.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ValidationError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }

    serde_json::from_slice(bytes).map_err(|e| ValidationError::MalformedBody {
        reason: e.to_string(),
    })
}

/// A payload known to carry every required key.
#[derive(Debug)]
pub struct Payload<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Payload<'a> {
    /// Check that every column name is present as a key.
    ///
    /// All absent names are reported, in column order. A non-object payload
    /// has no keys, so every column is reported missing.
    pub fn require(value: &'a Value, columns: &[Column]) -> Result<Self, ValidationError> {
        let missing: Vec<&'static str> = columns
            .iter()
            .map(|c| c.name)
            .filter(|name| value.get(name).is_none())
            .collect();

        match value.as_object() {
            Some(fields) if missing.is_empty() => Ok(Self { fields }),
            _ => Err(ValidationError::MissingFields { fields: missing }),
        }
    }

    /// Read a text field. Only JSON strings are accepted.
    pub fn text(&self, field: &'static str) -> Result<String, ValidationError> {
        match self.fields.get(field) {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ValidationError::InvalidFormat {
                field,
                reason: "expected a string",
            }),
        }
    }

    /// Read a field and coerce it to an integer.
    pub fn integer(&self, field: &'static str) -> Result<i64, ValidationError> {
        self.fields
            .get(field)
            .and_then(coerce_integer)
            .ok_or(ValidationError::InvalidFormat {
                field,
                reason: "expected an integer",
            })
    }
}

/// Coerce a JSON value to `i64` without truncation.
///
/// Accepts integers, floats with no fractional part, and strings holding a
/// base-10 integer (surrounding whitespace ignored).
pub fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64().filter(|f| {
                f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64
            })
            .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
