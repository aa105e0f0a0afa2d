//! Route table and operation dispatch.
//!
//! # Responsibilities
//! - Store compiled paths
//! - Look up the path matching a request
//! - Reject operations the path does not support
//! - Answer help requests from path metadata
//! - Invoke the handler with validated field data
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) pattern scan (acceptable for typical route counts)
//! - Explicit errors rather than silent defaults

use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::framework::{DisplayAttributes, FieldData, FrameworkError, Path};
use crate::logical::{LogicalError, Operation, Request, Response};

/// A mounted backend: help text plus an immutable route table.
#[derive(Debug, Clone)]
pub struct Backend {
    help: Arc<str>,
    paths: Arc<[Path]>,
}

impl Backend {
    /// Freeze `paths` into a route table.
    pub fn new(help: impl Into<String>, paths: Vec<Path>) -> Result<Self, FrameworkError> {
        for (i, path) in paths.iter().enumerate() {
            let pattern = path.pattern().as_str();
            if paths[..i].iter().any(|p| p.pattern().as_str() == pattern) {
                return Err(FrameworkError::DuplicatePattern(pattern.to_string()));
            }
        }

        let help: String = help.into();
        Ok(Self {
            help: Arc::from(help),
            paths: Arc::from(paths),
        })
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    /// First registered path whose pattern matches, with its captures.
    pub fn route(&self, path: &str) -> Option<(&Path, Map<String, Value>)> {
        self.paths
            .iter()
            .find_map(|p| p.pattern().matches(path).map(|captured| (p, captured)))
    }

    /// Checks that `path` routes and its path accepts `operation`, without
    /// running anything. Help is accepted on every routed path.
    pub fn check_operation(&self, path: &str, operation: Operation) -> Result<(), LogicalError> {
        let Some((matched, _)) = self.route(path) else {
            return Err(LogicalError::UnsupportedPath(path.to_string()));
        };
        if operation != Operation::Help && matched.handler(operation).is_none() {
            return Err(LogicalError::UnsupportedOperation {
                operation,
                path: path.to_string(),
            });
        }
        Ok(())
    }

    /// Dispatch one logical request.
    ///
    /// The handler runs under the request context, so a cancelled or
    /// expired context ends the call even if the handler never checks it.
    pub async fn handle_request(&self, req: Request) -> Result<Option<Response>, LogicalError> {
        let Some((path, captured)) = self.route(&req.path) else {
            tracing::warn!(
                request_id = %req.request_id,
                path = %req.path,
                "No path matched"
            );
            return Err(LogicalError::UnsupportedPath(req.path));
        };

        if req.operation == Operation::Help {
            return Ok(Some(help_response(path)));
        }

        let Some(handler) = path.handler(req.operation).cloned() else {
            tracing::warn!(
                request_id = %req.request_id,
                operation = %req.operation,
                path = %req.path,
                pattern = %path.pattern(),
                "Operation not supported on path"
            );
            return Err(LogicalError::UnsupportedOperation {
                operation: req.operation,
                path: req.path,
            });
        };

        if let Some(err) = req.context.err() {
            return Err(err);
        }

        let mut raw = req.data.clone();
        raw.extend(captured);
        let data = FieldData::new(raw, path.fields().clone());
        data.validate()?;

        tracing::debug!(
            request_id = %req.request_id,
            operation = %req.operation,
            path = %req.path,
            pattern = %path.pattern(),
            "Dispatching to handler"
        );

        let ignored: Vec<String> = data
            .unknown_fields()
            .into_iter()
            .map(str::to_string)
            .collect();

        let ctx = req.context.clone();
        let mut resp = ctx.run(handler(ctx.clone(), req, data)).await??;
        if let Some(resp) = resp.as_mut().filter(|r| !r.is_raw()) {
            if !ignored.is_empty() {
                resp.add_warning(format!(
                    "Endpoint ignored these unrecognized parameters: {:?}",
                    ignored
                ));
            }
        }
        Ok(resp)
    }
}

fn help_response(path: &Path) -> Response {
    let mut help = format!("Matching Route: ^{}\n", path.pattern().as_str().trim_start_matches('^'));
    if !path.help_synopsis().is_empty() {
        help.push_str(&format!("\n{}\n", path.help_synopsis()));
    }
    if !path.help_description().is_empty() {
        help.push_str(&format!("\n## DESCRIPTION\n\n{}\n", path.help_description()));
    }

    let mut data = Map::new();
    data.insert("help".into(), Value::String(help));
    data.insert("see_also".into(), json!([]));
    data.insert("pattern".into(), Value::from(path.pattern().as_str()));
    data.insert("operations".into(), json!(path.operations()));
    data.insert("display_attrs".into(), json!(path.display_attrs()));
    data.insert(
        "operation_id".into(),
        json!(path.display_attrs().and_then(DisplayAttributes::operation_id)),
    );
    data.insert("fields".into(), json!(path.fields()));
    Response::with_data(data)
}
