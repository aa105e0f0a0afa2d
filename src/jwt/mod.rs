//! JWT auth backend.
//!
//! Only the diagnostic `ui` route lives here; token issuance and credential
//! validation are handled elsewhere.

pub mod backend;
pub mod path_ui;

pub use backend::{factory, JwtAuthBackend, OPERATION_PREFIX_JWT};
