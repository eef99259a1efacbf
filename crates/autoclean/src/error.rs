//! Custom error types for the cleaning pipeline.
//!
//! The core operations (`infer`, `clean`, `score`) are total over a valid
//! [`Table`](crate::table::Table), so errors only surface at the edges:
//! building a table from raw columns, talking to an external cleaning
//! service, and file I/O.
//!
//! Errors are serializable so they can be emitted as part of a JSON report.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// A column's length does not match the rest of the table.
    #[error("Column '{column}' has {found} values, expected {expected}")]
    InvalidTableShape {
        column: String,
        expected: usize,
        found: usize,
    },

    /// Two columns share the same name.
    #[error("Duplicate column name '{0}'")]
    DuplicateColumn(String),

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// The external cleaning strategy could not produce a table.
    ///
    /// Callers are expected to fall back to the deterministic pipeline.
    #[error("Cleaning strategy unavailable: {0}")]
    StrategyUnavailable(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error (only with the "ai" feature).
    #[cfg(feature = "ai")]
    #[error("HTTP request error: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for machine consumers of the JSON report.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidTableShape { .. } => "INVALID_TABLE_SHAPE",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::StrategyUnavailable(_) => "STRATEGY_UNAVAILABLE",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            #[cfg(feature = "ai")]
            Self::HttpRequest(_) => "HTTP_REQUEST_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error means the strategy should be swapped for the
    /// deterministic pipeline.
    pub fn is_strategy_unavailable(&self) -> bool {
        match self {
            Self::StrategyUnavailable(_) => true,
            Self::WithContext { source, .. } => source.is_strategy_unavailable(),
            _ => false,
        }
    }

    /// Check if this error is a structural rejection of the input table.
    pub fn is_invalid_input(&self) -> bool {
        match self {
            Self::InvalidTableShape { .. } | Self::DuplicateColumn(_) => true,
            Self::WithContext { source, .. } => source.is_invalid_input(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            CleaningError::StrategyUnavailable("offline".to_string()).error_code(),
            "STRATEGY_UNAVAILABLE"
        );
        assert_eq!(
            CleaningError::InvalidTableShape {
                column: "b".to_string(),
                expected: 3,
                found: 2,
            }
            .error_code(),
            "INVALID_TABLE_SHAPE"
        );
    }

    #[test]
    fn test_is_strategy_unavailable_through_context() {
        let error = CleaningError::StrategyUnavailable("no key".to_string())
            .with_context("Delegated cleaning");
        assert!(error.is_strategy_unavailable());
        assert!(!CleaningError::DuplicateColumn("a".to_string()).is_strategy_unavailable());
    }

    #[test]
    fn test_is_invalid_input() {
        assert!(CleaningError::DuplicateColumn("a".to_string()).is_invalid_input());
        assert!(!CleaningError::InvalidConfig("x".to_string()).is_invalid_input());
    }

    #[test]
    fn test_error_serialization() {
        let error = CleaningError::ColumnNotFound("Age".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Age"));
    }

    #[test]
    fn test_with_context_preserves_code() {
        let error = CleaningError::DuplicateColumn("id".to_string()).with_context("Loading CSV");
        assert!(error.to_string().contains("Loading CSV"));
        assert_eq!(error.error_code(), "DUPLICATE_COLUMN");
    }
}
