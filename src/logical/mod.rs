//! Logical request/response model shared by backends and the transport.
//!
//! # Data Flow
//! ```text
//! transport (HTTP)
//!     → Request { operation, path, data, context }
//!     → backend router (framework)
//!     → Result<Option<Response>, LogicalError>
//!     → transport translates to wire-level HTTP
//! ```
//!
//! # Design Decisions
//! - No dependency on the HTTP stack; backends never see axum types
//! - Raw HTTP responses are ordinary data under reserved keys
//! - Every failure is a typed `LogicalError`; status mapping lives in the transport

pub mod context;
pub mod error;
pub mod operation;
pub mod request;
pub mod response;

pub use context::{CancelHandle, Context};
pub use error::LogicalError;
pub use operation::Operation;
pub use request::Request;
pub use response::{
    Response, HTTP_CONTENT_TYPE, HTTP_RAW_BODY, HTTP_RAW_CACHE_CONTROL, HTTP_STATUS_CODE,
};
