//! # Error Types
//!
//! Structured error types for bridge_core. Every edit operation validates its
//! preconditions before touching the model, so an `Err` always means the
//! model is unchanged.
//!
//! ## Example
//!
//! ```rust
//! use bridge_core::errors::{BridgeError, BridgeResult};
//!
//! fn validate_length(length_ft: f64) -> BridgeResult<()> {
//!     if length_ft <= 0.0 {
//!         return Err(BridgeError::InvalidInput {
//!             field: "length_ft".to_string(),
//!             value: length_ft.to_string(),
//!             reason: "Span length must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for bridge_core operations
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Structured error type for topology edits, persistence and file access.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum BridgeError {
    /// An input value is invalid (out of range, non-finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A referenced entity does not exist
    #[error("{kind} not found: {key}")]
    NotFound { kind: String, key: String },

    /// A structural precondition of an edit is not met
    #[error("Cannot {operation}: {reason}")]
    Precondition { operation: String, reason: String },

    /// The structural validator found broken invariants
    #[error("Bridge model is inconsistent: {}", violations.join("; "))]
    InvariantViolation { violations: Vec<String> },

    /// A persisted unit is missing a required property
    #[error("Missing property '{property}' in unit '{unit}'")]
    MissingProperty { unit: String, property: String },

    /// The persisted data does not contain the expected unit
    #[error("Expected unit '{expected}', found '{found}'")]
    UnexpectedUnit { expected: String, found: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema or unit version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl BridgeError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, key: impl ToString) -> Self {
        BridgeError::NotFound {
            kind: kind.into(),
            key: key.to_string(),
        }
    }

    /// Create a Precondition error
    pub fn precondition(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::Precondition {
            operation: operation.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingProperty error
    pub fn missing_property(unit: impl Into<String>, property: impl Into<String>) -> Self {
        BridgeError::MissingProperty {
            unit: unit.into(),
            property: property.into(),
        }
    }

    /// Create an UnexpectedUnit error
    pub fn unexpected_unit(expected: impl Into<String>, found: impl Into<String>) -> Self {
        BridgeError::UnexpectedUnit {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        BridgeError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        BridgeError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a VersionMismatch error
    pub fn version_mismatch(file_version: impl ToString, expected_version: impl ToString) -> Self {
        BridgeError::VersionMismatch {
            file_version: file_version.to_string(),
            expected_version: expected_version.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BridgeError::FileLocked { .. })
    }

    /// True for failures caused by persisted data rather than by a caller
    pub fn is_load_failure(&self) -> bool {
        matches!(
            self,
            BridgeError::MissingProperty { .. }
                | BridgeError::UnexpectedUnit { .. }
                | BridgeError::SerializationError { .. }
                | BridgeError::VersionMismatch { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            BridgeError::InvalidInput { .. } => "INVALID_INPUT",
            BridgeError::NotFound { .. } => "NOT_FOUND",
            BridgeError::Precondition { .. } => "PRECONDITION_FAILED",
            BridgeError::InvariantViolation { .. } => "INVARIANT_VIOLATION",
            BridgeError::MissingProperty { .. } => "MISSING_PROPERTY",
            BridgeError::UnexpectedUnit { .. } => "UNEXPECTED_UNIT",
            BridgeError::FileError { .. } => "FILE_ERROR",
            BridgeError::FileLocked { .. } => "FILE_LOCKED",
            BridgeError::SerializationError { .. } => "SERIALIZATION_ERROR",
            BridgeError::VersionMismatch { .. } => "VERSION_MISMATCH",
            BridgeError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

impl From<serde_json::Error> for BridgeError {
    fn from(e: serde_json::Error) -> Self {
        BridgeError::SerializationError { reason: e.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = BridgeError::invalid_input("length_ft", "-5.0", "Span length must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: BridgeError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(BridgeError::not_found("Pier", 3).error_code(), "NOT_FOUND");
        assert_eq!(
            BridgeError::precondition("remove span", "only one span").error_code(),
            "PRECONDITION_FAILED"
        );
        assert_eq!(BridgeError::missing_property("Pier", "Station").error_code(), "MISSING_PROPERTY");
    }

    #[test]
    fn test_invariant_message_joins_violations() {
        let error = BridgeError::InvariantViolation {
            violations: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(error.to_string(), "Bridge model is inconsistent: a; b");
    }

    #[test]
    fn test_load_failure_classification() {
        assert!(BridgeError::version_mismatch("9.0", "3.0").is_load_failure());
        assert!(!BridgeError::precondition("x", "y").is_load_failure());
        assert!(BridgeError::file_locked("p", "u", "t").is_recoverable());
    }
}
