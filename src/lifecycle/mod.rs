//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Build backend → Start listener
//!
//! Shutdown (shutdown.rs):
//!     Signal or trigger → Stop accepting → Drain in-flight requests → Exit
//! ```

pub mod shutdown;

pub use shutdown::{wait_for_shutdown, Shutdown, ShutdownCause};
