//! Error handling for record layouts and line sorting

use std::io;
use thiserror::Error;

/// Custom error type for record operations
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Permission denied: {file}")]
    PermissionDenied { file: String },

    #[error("No such file or directory: {file}")]
    FileNotFound { file: String },

    #[error("Invalid key specification: {spec}")]
    InvalidKeySpec { spec: String },

    #[error("Conflicting sort options: {message}")]
    ConflictingOptions { message: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Invalid operand for {operation}: {kind} is not numeric")]
    InvalidOperand { operation: String, kind: String },

    #[error("Division by zero")]
    DivideByZero,

    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },

    #[error("Subvalue access is not supported for {kind} fields")]
    SubvalueUnsupported { kind: String },

    #[error("Subvalue result {text:?} is not a valid {kind}")]
    SubvalueParseError { text: String, kind: String },

    #[error("Subvalue positions start at 1, got {start}")]
    SubvalueRange { start: usize },

    #[error("Index {index} out of range for group of {len} members")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Condition evaluation failed: {message}")]
    ConditionEvaluationFailure { message: String },
}

impl RecordError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            RecordError::PermissionDenied { .. }
            | RecordError::FileNotFound { .. }
            | RecordError::Io(_) => crate::SORT_FAILURE,

            _ => crate::EXIT_FAILURE,
        }
    }

    /// Create a permission denied error
    pub fn permission_denied(file: &str) -> Self {
        RecordError::PermissionDenied {
            file: file.to_string(),
        }
    }

    /// Create a file not found error
    pub fn file_not_found(file: &str) -> Self {
        RecordError::FileNotFound {
            file: file.to_string(),
        }
    }

    /// Create an invalid key spec error
    pub fn invalid_key_spec(spec: &str) -> Self {
        RecordError::InvalidKeySpec {
            spec: spec.to_string(),
        }
    }

    /// Create a conflicting options error
    pub fn conflicting_options(message: &str) -> Self {
        RecordError::ConflictingOptions {
            message: message.to_string(),
        }
    }

    /// Create a parse error
    pub fn parse_error(message: &str) -> Self {
        RecordError::ParseError {
            message: message.to_string(),
        }
    }

    pub fn invalid_operand(operation: &str, kind: impl ToString) -> Self {
        RecordError::InvalidOperand {
            operation: operation.to_string(),
            kind: kind.to_string(),
        }
    }

    pub fn overflow(operation: &str) -> Self {
        RecordError::Overflow {
            operation: operation.to_string(),
        }
    }

    pub fn subvalue_unsupported(kind: impl ToString) -> Self {
        RecordError::SubvalueUnsupported {
            kind: kind.to_string(),
        }
    }

    pub fn subvalue_parse_error(text: &str, kind: impl ToString) -> Self {
        RecordError::SubvalueParseError {
            text: text.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Create a condition failure error
    pub fn condition_failure(message: &str) -> Self {
        RecordError::ConditionEvaluationFailure {
            message: message.to_string(),
        }
    }
}

/// Result type for record operations
pub type RecordResult<T> = Result<T, RecordError>;

/// Context trait for adding file names to I/O errors
pub trait RecordContext<T> {
    fn with_file_context(self, filename: &str) -> RecordResult<T>;
}

impl<T> RecordContext<T> for Result<T, io::Error> {
    fn with_file_context(self, filename: &str) -> RecordResult<T> {
        self.map_err(|io_err| match io_err.kind() {
            io::ErrorKind::PermissionDenied => RecordError::permission_denied(filename),
            io::ErrorKind::NotFound => RecordError::file_not_found(filename),
            _ => RecordError::Io(io::Error::new(
                io_err.kind(),
                format!("{}: {}", filename, io_err),
            )),
        })
    }
}
