//! Error types and exit codes for textreuse
//!
//! Exit codes:
//! - 0: Success
//! - 1: Generic failure (I/O, serialization)
//! - 2: Usage or configuration error (bad flags, invalid config values)
//! - 3: Data error (corrupt index, label out of range, missing segment)

mod macros;

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the textreuse CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success (0)
    Success = 0,
    /// Generic failure (1)
    Failure = 1,
    /// Usage or configuration error (2)
    Usage = 2,
    /// Data error (3)
    Data = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code as i32
    }
}

/// Errors that can occur while detecting reuse
#[derive(Error, Debug)]
pub enum ReuseError {
    // Usage and configuration errors (exit code 2)
    #[error("{0}")]
    UsageError(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid {context}: {value}")]
    InvalidValue { context: String, value: String },

    #[error("dimension mismatch: index expects {expected} dimensions, vector has {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    // Data errors (exit code 3)
    #[error("no label for index position {position}")]
    InvalidLabel { position: usize },

    #[error("segment {segment} not found in {path:?}")]
    MissingSegment { path: PathBuf, segment: usize },

    #[error("corrupt index at {path:?}: {reason}")]
    CorruptIndex { path: PathBuf, reason: String },

    #[error("empty corpus: no input documents")]
    EmptyCorpus,

    // Generic failures (exit code 1)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to read {path:?}: {reason}")]
    ReadFile { path: PathBuf, reason: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to encode index: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error("failed to decode index: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("failed to {operation}: {reason}")]
    FailedOperation { operation: String, reason: String },

    /// A failure annotated with the pipeline stage it came from
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: Box<ReuseError>,
    },
}

impl ReuseError {
    /// Create an error for an unreadable input file
    pub fn read_file(path: impl Into<PathBuf>, error: impl std::fmt::Display) -> Self {
        ReuseError::ReadFile {
            path: path.into(),
            reason: error.to_string(),
        }
    }

    /// Create an error for an invalid value or configuration
    pub fn invalid_value(context: &str, value: impl std::fmt::Display) -> Self {
        ReuseError::InvalidValue {
            context: context.to_string(),
            value: value.to_string(),
        }
    }

    /// Create an error for a failed operation
    pub fn failed(operation: &str, error: impl std::fmt::Display) -> Self {
        ReuseError::FailedOperation {
            operation: operation.to_string(),
            reason: error.to_string(),
        }
    }

    /// Attach the name of the pipeline stage that produced this error
    pub fn in_stage(self, stage: &'static str) -> Self {
        match self {
            already @ ReuseError::Stage { .. } => already,
            other => ReuseError::Stage {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// Stage name, if this error was annotated with one
    pub fn stage(&self) -> Option<&'static str> {
        match self {
            ReuseError::Stage { stage, .. } => Some(stage),
            _ => None,
        }
    }

    /// Get the appropriate exit code for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ReuseError::UsageError(_)
            | ReuseError::InvalidConfig(_)
            | ReuseError::InvalidValue { .. }
            | ReuseError::DimensionMismatch { .. } => ExitCode::Usage,

            ReuseError::InvalidLabel { .. }
            | ReuseError::MissingSegment { .. }
            | ReuseError::CorruptIndex { .. }
            | ReuseError::EmptyCorpus => ExitCode::Data,

            ReuseError::Io(_)
            | ReuseError::ReadFile { .. }
            | ReuseError::Json(_)
            | ReuseError::Toml(_)
            | ReuseError::Encode(_)
            | ReuseError::Decode(_)
            | ReuseError::FailedOperation { .. } => ExitCode::Failure,

            ReuseError::Stage { source, .. } => source.exit_code(),
        }
    }

    /// Get the error type identifier
    fn error_type(&self) -> &'static str {
        match self {
            ReuseError::UsageError(_) => "usage_error",
            ReuseError::InvalidConfig(_) => "invalid_config",
            ReuseError::InvalidValue { .. } => "invalid_value",
            ReuseError::DimensionMismatch { .. } => "dimension_mismatch",
            ReuseError::InvalidLabel { .. } => "invalid_label",
            ReuseError::MissingSegment { .. } => "missing_segment",
            ReuseError::CorruptIndex { .. } => "corrupt_index",
            ReuseError::EmptyCorpus => "empty_corpus",
            ReuseError::Io(_) => "io_error",
            ReuseError::ReadFile { .. } => "read_error",
            ReuseError::Json(_) => "json_error",
            ReuseError::Toml(_) => "toml_error",
            ReuseError::Encode(_) => "encode_error",
            ReuseError::Decode(_) => "decode_error",
            ReuseError::FailedOperation { .. } => "failed_operation",
            ReuseError::Stage { source, .. } => source.error_type(),
        }
    }

    /// Convert error to JSON representation for structured error output.
    pub fn to_json(&self) -> serde_json::Value {
        let mut error_obj = serde_json::json!({
            "code": self.exit_code() as i32,
            "type": self.error_type(),
            "message": self.to_string(),
        });

        if let Some(stage) = self.stage() {
            error_obj["stage"] = serde_json::json!(stage);
        }

        serde_json::json!({ "error": error_obj })
    }
}

/// Result type alias for textreuse operations
pub type Result<T> = std::result::Result<T, ReuseError>;
