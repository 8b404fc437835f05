//! Validation error types

use std::fmt;

/// Validation error for incoming payloads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// One or more required keys are absent from the payload
    MissingFields { fields: Vec<&'static str> },

    /// Field is present but cannot be coerced to its column type
    InvalidFormat {
        field: &'static str,
        reason: &'static str,
    },

    /// Request body is not parseable JSON
    MalformedBody { reason: String },
}

impl ValidationError {
    /// Whether this error came from the presence check rather than coercion.
    pub fn is_missing_fields(&self) -> bool {
        matches!(self, Self::MissingFields { .. })
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingFields { fields } => {
                write!(f, "missing required fields: {}", fields.join(", "))
            }
            Self::InvalidFormat { field, reason } => write!(f, "{}: {}", field, reason),
            Self::MalformedBody { reason } => write!(f, "malformed JSON body: {}", reason),
        }
    }
}

impl std::error::Error for ValidationError {}
