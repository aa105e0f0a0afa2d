//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//! - Validate the mount path is a single segment
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PluginConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::PluginConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("mount.path must be a non-empty single segment, got {0:?}")]
    MountPath(String),

    #[error("ui.file_path must not be empty")]
    UiFilePath,

    #[error("timeouts.request_secs must be greater than zero")]
    RequestTimeout,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

pub fn validate_config(config: &PluginConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    let mount = &config.mount.path;
    if mount.is_empty() || mount.contains('/') || mount.chars().any(char::is_whitespace) {
        errors.push(ValidationError::MountPath(mount.clone()));
    }

    if config.ui.file_path.as_os_str().is_empty() {
        errors.push(ValidationError::UiFilePath);
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::RequestTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
