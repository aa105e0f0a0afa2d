//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the plugin
//! server. All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PluginConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Where the backend is mounted under `/v1/auth/`.
    pub mount: MountConfig,

    /// Diagnostic UI page settings.
    pub ui: UiConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8200").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8200".to_string(),
        }
    }
}

/// Mount configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MountConfig {
    /// Mount path segment, e.g. "jwt" for `/v1/auth/jwt/`.
    pub path: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            path: "jwt".to_string(),
        }
    }
}

/// Diagnostic UI configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UiConfig {
    /// HTML file served by the `ui` route. Relative paths resolve against the
    /// process working directory.
    pub file_path: PathBuf,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            file_path: PathBuf::from("test_ui.html"),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout in seconds; also the logical request deadline.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
