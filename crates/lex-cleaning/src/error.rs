//! Error types for the cleaning transformers.
//!
//! Every failure a transformer can report is a variant of [`CleaningError`].
//! Variants fall into families, exposed through [`CleaningError::kind`]:
//!
//! - **Configuration** errors are raised while building a transformer (or when
//!   the configured columns do not match the table) and are never recovered.
//! - **Usage** errors are raised when the fit/transform contract is broken,
//!   e.g. calling `transform` before `fit`.
//! - **Data** errors are raised when the values of a column cannot feed the
//!   requested computation.
//! - **Internal** errors wrap IO, Polars and JSON failures.
//!
//! Errors are serializable so that callers can forward them as
//! `{ "code": ..., "kind": ..., "message": ... }` payloads.

use crate::config::ColumnType;
use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// Coarse classification of a [`CleaningError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Configuration,
    Usage,
    Data,
    Internal,
}

/// The main error type for the cleaning transformers.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// A column name was listed under more than one column type.
    #[error("Column '{column}' is listed as both {first} and {second}")]
    DuplicateColumn {
        column: String,
        first: ColumnType,
        second: ColumnType,
    },

    /// A fractional threshold fell outside `[0, 1]`.
    #[error("Invalid threshold for '{field}': {value} (must be between 0.0 and 1.0)")]
    InvalidThreshold { field: String, value: f64 },

    /// A configured column does not have the dtype the transformer operates on.
    #[error("Column '{column}' must be a {expected} column")]
    InvalidColumnType { column: String, expected: String },

    /// Column was not found in the table.
    #[error("Column '{0}' not found in table")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// `transform` was called on a transformer that was never fit.
    #[error("{0} must be fit before calling transform")]
    NotFitted(&'static str),

    /// A column needs a fill value but was not seen during fit.
    #[error("Column '{0}' has missing values but no fill value was learned for it")]
    UnfittedColumn(String),

    /// Column values are incompatible with the declared column type.
    #[error("Column '{column}' is declared {expected} but has dtype {found}")]
    TypeMismatch {
        column: String,
        expected: ColumnType,
        found: String,
    },

    /// No valid values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// A rate was requested over a table with no rows or no columns.
    #[error("Cannot compute {0} on an empty table")]
    EmptyTable(&'static str),

    /// Row keys do not line up with the frame they describe.
    #[error("Invalid row keys: {0}")]
    InvalidRowKeys(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

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

    /// Which family of the error taxonomy this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::DuplicateColumn { .. }
            | Self::InvalidThreshold { .. }
            | Self::InvalidColumnType { .. }
            | Self::ColumnNotFound(_)
            | Self::InvalidConfig(_) => ErrorKind::Configuration,
            Self::NotFitted(_) | Self::UnfittedColumn(_) => ErrorKind::Usage,
            Self::TypeMismatch { .. }
            | Self::NoValidValues(_)
            | Self::EmptyTable(_)
            | Self::InvalidRowKeys(_) => ErrorKind::Data,
            Self::Io(_) | Self::Polars(_) | Self::Json(_) => ErrorKind::Internal,
            Self::WithContext { source, .. } => source.kind(),
        }
    }

    /// Get a stable error code for programmatic handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::DuplicateColumn { .. } => "DUPLICATE_COLUMN",
            Self::InvalidThreshold { .. } => "INVALID_THRESHOLD",
            Self::InvalidColumnType { .. } => "INVALID_COLUMN_TYPE",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::NotFitted(_) => "NOT_FITTED",
            Self::UnfittedColumn(_) => "UNFITTED_COLUMN",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::EmptyTable(_) => "EMPTY_TABLE",
            Self::InvalidRowKeys(_) => "INVALID_ROW_KEYS",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error comes from calling the transformer out of order.
    pub fn is_usage_error(&self) -> bool {
        self.kind() == ErrorKind::Usage
    }
}

/// Errors are serialized as a struct with `code`, `kind` and `message` fields.
impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 3)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("kind", &self.kind())?;
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
