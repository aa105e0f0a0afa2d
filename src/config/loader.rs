//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::PluginConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<PluginConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: PluginConfig = toml::from_str(&content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("jwt-config-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_valid_config() {
        let path = write_config(
            r#"
            [listener]
            bind_address = "127.0.0.1:18200"

            [ui]
            file_path = "/srv/debug/test_ui.html"

            [timeouts]
            request_secs = 5
            "#,
        );
        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:18200");
        assert_eq!(config.ui.file_path.to_str(), Some("/srv/debug/test_ui.html"));
        assert_eq!(config.timeouts.request_secs, 5);
        assert_eq!(config.mount.path, "jwt");
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("definitely-missing-jwt-config.toml");
        assert!(matches!(load_config(&path), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_parse_error() {
        let path = write_config("[listener\nbind_address = 1");
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_validation_error_lists_problems() {
        let path = write_config("[mount]\npath = \"\"\n[timeouts]\nrequest_secs = 0\n");
        let err = load_config(&path).unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("Validation failed: "));
        assert!(message.contains("mount.path"));
        assert!(message.contains("request_secs"));
    }
}
