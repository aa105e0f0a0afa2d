//! Backend construction.

use std::path::{Path as FsPath, PathBuf};
use std::sync::Arc;

use crate::config::schema::UiConfig;
use crate::framework::{Backend, FrameworkError};
use crate::jwt::path_ui::path_ui;

/// Operation prefix used in generated operation ids (`jwt-ui`).
pub const OPERATION_PREFIX_JWT: &str = "jwt";

const BACKEND_HELP: &str = "\
The JWT backend plugin allows authentication using JWTs (including OIDC).

This build only carries the diagnostic `ui` endpoint, which serves a local
HTML page for exercising the backend from a browser.";

/// State shared by the backend's handlers.
#[derive(Debug)]
pub struct JwtAuthBackend {
    ui_file: PathBuf,
}

impl JwtAuthBackend {
    pub fn new(config: &UiConfig) -> Self {
        Self {
            ui_file: config.file_path.clone(),
        }
    }

    /// Page served by the `ui` route, relative to the working directory unless absolute.
    pub fn ui_file(&self) -> &FsPath {
        &self.ui_file
    }
}

/// Build the backend and its immutable route table.
pub fn factory(config: &UiConfig) -> Result<Backend, FrameworkError> {
    let b = Arc::new(JwtAuthBackend::new(config));
    let paths = vec![path_ui(&b)?];

    tracing::debug!(
        ui_file = %b.ui_file().display(),
        routes = paths.len(),
        "JWT auth backend initialized"
    );

    Backend::new(BACKEND_HELP, paths)
}
