//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Pick the log filter from the environment or the config
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Pretty fmt output on stdout

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(config: &ObservabilityConfig) -> String {
    format!(
        "jwt_auth_backend={level},tower_http={level}",
        level = config.log_level
    )
}

/// Install the global subscriber.
///
/// Returns an error if a global subscriber is already set.
pub fn init(config: &ObservabilityConfig) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(config).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
}
