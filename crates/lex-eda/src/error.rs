//! Error types for the exploratory analysis engine.
//!
//! Every engine operation returns a typed [`EdaError`] to its caller; nothing
//! in the library terminates the process. Errors serialize as `{code, message}`
//! so a front end can branch on the code and show the message verbatim.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analysis engine.
#[derive(Error, Debug)]
pub enum EdaError {
    /// The input table could not be read or parsed.
    #[error("Failed to load table: {0}")]
    Load(String),

    /// A referenced column does not exist in the table.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// A column exists but cannot be used for the requested operation.
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// Unknown transformation or feature operator.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Too few numeric columns for an operation that needs several.
    #[error("Insufficient columns: need at least {required} numeric columns, found {found}")]
    InsufficientColumns { required: usize, found: usize },

    /// A derived column would overwrite an existing one.
    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    /// An operation was called on input that violates its precondition.
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<EdaError>,
    },
}

impl EdaError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        EdaError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for [`EdaError::InvalidColumn`].
    pub fn invalid_column(column: impl Into<String>, reason: impl Into<String>) -> Self {
        EdaError::InvalidColumn {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Stable error code for front-end handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load(_) => "LOAD_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidColumn { .. } => "INVALID_COLUMN",
            Self::UnsupportedOperation(_) => "UNSUPPORTED_OPERATION",
            Self::InsufficientColumns { .. } => "INSUFFICIENT_COLUMNS",
            Self::DuplicateColumn(_) => "DUPLICATE_COLUMN",
            Self::Precondition(_) => "PRECONDITION_FAILED",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Whether the caller can fix this by changing its selection
    /// (column choice, operator, feature name) and retrying on the same table.
    pub fn is_user_correctable(&self) -> bool {
        match self {
            Self::ColumnNotFound(_)
            | Self::InvalidColumn { .. }
            | Self::UnsupportedOperation(_)
            | Self::InsufficientColumns { .. }
            | Self::DuplicateColumn(_) => true,
            Self::WithContext { source, .. } => source.is_user_correctable(),
            _ => false,
        }
    }
}

impl Serialize for EdaError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("EdaError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EdaError>;

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
        self.map_err(|e| EdaError::Polars(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| EdaError::Io(e).with_context(context))
    }
}
