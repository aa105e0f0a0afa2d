//! Typed failures returned by handlers and the backend router.

use std::path::PathBuf;

use thiserror::Error;

use crate::logical::Operation;

/// Errors surfaced from a logical request.
///
/// The transport maps each kind to a status code; nothing here is fatal to
/// the process.
#[derive(Debug, Error)]
pub enum LogicalError {
    /// No registered pattern matched the request path.
    #[error("unsupported path: {0}")]
    UnsupportedPath(String),

    /// The path matched but has no handler for the operation.
    #[error("unsupported operation: {operation} on {path}")]
    UnsupportedOperation { operation: Operation, path: String },

    /// Request data failed field validation.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A local resource could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The request context was cancelled by the caller.
    #[error("request cancelled")]
    Cancelled,

    /// The request context deadline passed.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Backend produced something the transport cannot render.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LogicalError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        LogicalError::Io {
            path: path.into(),
            source,
        }
    }

    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            LogicalError::UnsupportedPath(_) => "unsupported_path",
            LogicalError::UnsupportedOperation { .. } => "unsupported_operation",
            LogicalError::InvalidRequest(_) => "invalid_request",
            LogicalError::Io { .. } => "io",
            LogicalError::Cancelled => "cancelled",
            LogicalError::DeadlineExceeded => "deadline_exceeded",
            LogicalError::Internal(_) => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_message_names_file() {
        let err = LogicalError::io(
            "test_ui.html",
            std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        );
        assert_eq!(err.kind(), "io");
        assert!(err.to_string().contains("test_ui.html"));
    }

    #[test]
    fn test_unsupported_operation_message() {
        let err = LogicalError::UnsupportedOperation {
            operation: Operation::Delete,
            path: "ui".into(),
        };
        assert_eq!(err.to_string(), "unsupported operation: delete on ui");
    }
}
