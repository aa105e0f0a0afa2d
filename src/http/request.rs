//! Request handling and translation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Map HTTP method and query flags to a logical operation
//! - Turn query parameters or a JSON body into logical request data
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - `help=1` and `list=true` only apply to GET
//! - Write bodies must be JSON objects; everything else is a 400

use std::collections::HashMap;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, Request};
use serde_json::{Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

use crate::logical::{LogicalError, Operation};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Non-standard verb used by clients for list operations.
pub const LIST_METHOD: &str = "LIST";

/// Assigns a v4 UUID to requests that arrive without an `x-request-id`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Request ID from the headers, or "unknown" if the layer did not run.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

fn flag(params: &HashMap<String, String>, name: &str) -> bool {
    params
        .get(name)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true"))
        .unwrap_or(false)
}

/// Logical operation for an HTTP request, `None` if the method has no mapping.
pub fn logical_operation(method: &Method, params: &HashMap<String, String>) -> Option<Operation> {
    match *method {
        Method::GET if flag(params, "help") => Some(Operation::Help),
        Method::GET if flag(params, "list") => Some(Operation::List),
        Method::GET => Some(Operation::Read),
        Method::POST | Method::PUT => Some(Operation::Write),
        Method::DELETE => Some(Operation::Delete),
        _ if method.as_str() == LIST_METHOD => Some(Operation::List),
        _ => None,
    }
}

/// Raw field data for the logical request.
pub fn request_data(
    operation: Operation,
    params: HashMap<String, String>,
    body: &Bytes,
) -> Result<Map<String, Value>, LogicalError> {
    if operation == Operation::Write {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }
        return match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(LogicalError::InvalidRequest(
                "request body must be a JSON object".into(),
            )),
            Err(e) => Err(LogicalError::InvalidRequest(format!(
                "failed to parse JSON body: {}",
                e
            ))),
        };
    }

    Ok(params
        .into_iter()
        .filter(|(k, _)| k != "help" && k != "list")
        .map(|(k, v)| (k, Value::String(v)))
        .collect())
}
