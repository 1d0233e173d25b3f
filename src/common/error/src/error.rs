//! Core error types for flatframe.

use thiserror::Error;

/// Result type alias using `FrameError`.
pub type FrameResult<T> = std::result::Result<T, FrameError>;

/// Generic boxed error for external error sources.
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for flatframe operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameError {
    /// Schema-related error (unknown column, duplicate name, incompatible
    /// column type for an operator).
    #[error("SchemaError: {0}")]
    SchemaError(String),

    /// Type mismatch (aggregate applied to an incompatible column,
    /// unhashable group key).
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Parse error at the row-source boundary.
    #[error("ParseError: {0}")]
    ParseError(String),

    /// Plan execution error.
    #[error("ExecutionError: {0}")]
    ExecutionError(String),

    /// Internal error (bug in flatframe).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// Arrow error.
    #[error("ArrowError: {0}")]
    ArrowError(#[from] arrow_schema::ArrowError),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// External error from third-party libraries.
    #[error("ExternalError: {0}")]
    ExternalError(GenericError),
}

impl FrameError {
    /// Create a new `SchemaError`.
    pub fn schema_error<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ParseError`.
    pub fn parse_error<S: Into<String>>(msg: S) -> Self {
        Self::ParseError(msg.into())
    }

    /// Create a new `ExecutionError`.
    pub fn execution<S: Into<String>>(msg: S) -> Self {
        Self::ExecutionError(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }
}

/// Ensure a condition holds, returning the named error variant if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::FrameError::ExecutionError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::FrameError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with a `SchemaError`.
#[macro_export]
macro_rules! schema_err {
    ($($arg:tt)*) => {
        return Err($crate::FrameError::SchemaError(format!($($arg)*)))
    };
}

/// Return early with a `TypeError`.
#[macro_export]
macro_rules! type_err {
    ($($arg:tt)*) => {
        return Err($crate::FrameError::TypeError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::type_error("expected Float64, got String");
        assert_eq!(err.to_string(), "TypeError: expected Float64, got String");
    }

    #[test]
    fn test_error_constructors() {
        let _ = FrameError::schema_error("column not found");
        let _ = FrameError::parse_error("bad header");
        let _ = FrameError::execution("operator not opened");
        let _ = FrameError::internal("unexpected state");
    }

    #[test]
    fn test_ensure_macro() {
        fn check(n: usize) -> FrameResult<()> {
            ensure!(n > 0, SchemaError: "schema must have at least one column");
            Ok(())
        }

        assert!(check(1).is_ok());
        assert!(matches!(check(0), Err(FrameError::SchemaError(_))));
    }
}
