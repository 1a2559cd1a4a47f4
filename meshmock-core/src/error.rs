use serde::Serialize;
use thiserror::Error;

/// Failure kinds surfaced by the mesh façade.
///
/// Every rejected call maps to exactly one [`ErrorKind`]; callers that only
/// care about the category should match on [`MeshError::kind`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    /// Operation attempted before `connect()` or after `disconnect()`.
    #[error("hardware subsystems are not connected")]
    NotConnected,
    /// Wrong type or shape for an identifier or state field.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },
    /// Correctly typed value outside its bounds.
    #[error("{field} {value} out of range {bounds}")]
    Range {
        field: &'static str,
        value: String,
        bounds: &'static str,
    },
    /// Individually valid arguments that contradict each other.
    #[error("conflicting arguments: {0}")]
    Conflict(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Connection,
    Validation,
    Range,
    Conflict,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Connection => "connection",
            ErrorKind::Validation => "validation",
            ErrorKind::Range => "range",
            ErrorKind::Conflict => "conflict",
        }
    }
}

impl MeshError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MeshError::NotConnected => ErrorKind::Connection,
            MeshError::Validation { .. } => ErrorKind::Validation,
            MeshError::Range { .. } => ErrorKind::Range,
            MeshError::Conflict(_) => ErrorKind::Conflict,
        }
    }

    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        MeshError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn range(field: &'static str, value: impl ToString, bounds: &'static str) -> Self {
        MeshError::Range {
            field,
            value: value.to_string(),
            bounds,
        }
    }
}

/// Alias for fallible mesh operations.
pub type MeshResult<T> = Result<T, MeshError>;
