//! JWT auth backend plugin library.
//!
//! A path-routing backend framework, the JWT backend's diagnostic `ui`
//! route, and an HTTP transport that mounts the backend.

pub mod config;
pub mod framework;
pub mod http;
pub mod jwt;
pub mod lifecycle;
pub mod logical;
pub mod observability;

pub use config::PluginConfig;
pub use framework::Backend;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
