//! Error types for the collector catalog.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using the catalog's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for catalog operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed category or field definition
    #[error("Validation error: {0}")]
    Validation(String),

    /// A submitted value does not fit the declared field type
    #[error("Invalid value for field '{field}': {message}")]
    InvalidField { field: String, message: String },

    /// Category key not found for the current owner
    #[error("Category not found: {0}")]
    CategoryNotFound(String),

    /// Record not found for the current owner
    #[error("Record not found: {0}")]
    RecordNotFound(uuid::Uuid),

    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage backend failure that is not an I/O error
    #[error("Storage error: {0}")]
    Storage(String),

    /// Token rejected or owner mismatch
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse error classification surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    Storage,
    AccessDenied,
    Internal,
}

impl Error {
    /// Shorthand for a field-level validation failure.
    pub fn invalid_field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidField {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) | Error::InvalidField { .. } => ErrorKind::Validation,
            Error::CategoryNotFound(_) | Error::RecordNotFound(_) => ErrorKind::NotFound,
            Error::Database(_) | Error::Io(_) | Error::Serialization(_) | Error::Storage(_) => {
                ErrorKind::Storage
            }
            Error::AccessDenied(_) => ErrorKind::AccessDenied,
            Error::Config(_) => ErrorKind::Internal,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_validation() {
        let err = Error::Validation("category name is required".to_string());
        assert_eq!(
            err.to_string(),
            "Validation error: category name is required"
        );
    }

    #[test]
    fn test_error_display_invalid_field() {
        let err = Error::invalid_field("grade", "'abc' is not a number");
        assert_eq!(
            err.to_string(),
            "Invalid value for field 'grade': 'abc' is not a number"
        );
    }

    #[test]
    fn test_error_display_category_not_found() {
        let err = Error::CategoryNotFound("comics".to_string());
        assert_eq!(err.to_string(), "Category not found: comics");
    }

    #[test]
    fn test_error_display_record_not_found() {
        let id = Uuid::nil();
        let err = Error::RecordNotFound(id);
        assert_eq!(err.to_string(), format!("Record not found: {}", id));
    }

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            Error::Validation("x".into()).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::invalid_field("a", "b").kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            Error::CategoryNotFound("x".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            Error::RecordNotFound(Uuid::nil()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(Error::Storage("x".into()).kind(), ErrorKind::Storage);
        assert_eq!(
            Error::Serialization("x".into()).kind(),
            ErrorKind::Storage
        );
        assert_eq!(
            Error::AccessDenied("x".into()).kind(),
            ErrorKind::AccessDenied
        );
        assert_eq!(Error::Config("x".into()).kind(), ErrorKind::Internal);
    }

    #[test]
    fn test_io_error_is_storage_kind() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(err.to_string().contains("I/O error:"));
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>(r#"{"invalid": json}"#);
        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_kind_serialization() {
        let json = serde_json::to_string(&ErrorKind::AccessDenied).unwrap();
        assert_eq!(json, "\"access_denied\"");
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
