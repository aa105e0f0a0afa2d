//! Path-routing plugin framework.
//!
//! # Data Flow
//! ```text
//! Backend construction (at startup):
//!     Path::builder(pattern) → operations, fields, display attrs
//!     → PathPattern compiled, duplicates rejected
//!     → Backend freezes Vec<Path> as immutable route table
//!
//! Per request:
//!     Request { operation, path }
//!     → backend.rs (first matching pattern wins)
//!     → help handled by the framework, otherwise operation lookup
//!     → field.rs (captures + raw data → FieldData, validated)
//!     → handler → Result<Option<Response>, LogicalError>
//! ```
//!
//! # Design Decisions
//! - Route table immutable after construction (shared without locks)
//! - Unsupported operations rejected before any handler runs
//! - Deterministic: registration order decides between overlapping patterns

pub mod backend;
pub mod field;
pub mod path;
pub mod pattern;

pub use backend::Backend;
pub use field::{FieldData, FieldSchema, FieldType};
pub use path::{operation_fn, DisplayAttributes, OperationFunc, OperationFuture, Path, PathBuilder};
pub use pattern::PathPattern;

use thiserror::Error;

use crate::logical::Operation;

/// Errors raised while assembling a backend's route table.
#[derive(Debug, Error)]
pub enum FrameworkError {
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("pattern {pattern:?} registers more than one {operation} handler")]
    DuplicateOperation { pattern: String, operation: Operation },

    #[error("pattern {pattern:?} registers a handler for the framework-reserved {operation} operation")]
    ReservedOperation { pattern: String, operation: Operation },

    #[error("pattern {pattern:?} captures {capture:?} without declaring a field for it")]
    UndeclaredCapture { pattern: String, capture: String },

    #[error("pattern {0:?} is registered twice")]
    DuplicatePattern(String),
}
