//! HTTP transport subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, method → operation, query/body → data)
//!     → framework::Backend (route + dispatch)
//!     → response.rs (raw passthrough, JSON envelope, error status)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
