//! Response handling and transformation.
//!
//! # Responsibilities
//! - Render raw logical responses verbatim (status, content type, body)
//! - Wrap structured logical responses in the JSON data envelope
//! - Map logical errors to HTTP status codes
//!
//! # Design Decisions
//! - The transport is the only place that knows about status codes
//! - A malformed raw response is a 500, never a partial body
//! - Errors use the `{"errors": [...]}` envelope

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::logical::{
    self, LogicalError, HTTP_CONTENT_TYPE, HTTP_RAW_BODY, HTTP_RAW_CACHE_CONTROL,
    HTTP_STATUS_CODE,
};

/// Status code for a logical failure.
pub fn status_for(err: &LogicalError) -> StatusCode {
    match err {
        LogicalError::UnsupportedPath(_) => StatusCode::NOT_FOUND,
        LogicalError::UnsupportedOperation { .. } => StatusCode::METHOD_NOT_ALLOWED,
        LogicalError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        LogicalError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        LogicalError::Cancelled => StatusCode::SERVICE_UNAVAILABLE,
        LogicalError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        LogicalError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// JSON error envelope.
pub fn error_response(status: StatusCode, errors: Vec<String>) -> Response {
    (status, Json(json!({ "errors": errors }))).into_response()
}

pub fn logical_error_response(err: &LogicalError) -> Response {
    error_response(status_for(err), vec![err.to_string()])
}

/// Translate a handler result into an HTTP response.
pub fn respond_logical(
    result: Result<Option<logical::Response>, LogicalError>,
    request_id: &str,
) -> Response {
    match result {
        Ok(Some(resp)) if resp.is_raw() => {
            respond_raw(resp).unwrap_or_else(|err| {
                tracing::error!(request_id = %request_id, error = %err, "Malformed raw response");
                logical_error_response(&err)
            })
        }
        Ok(Some(resp)) => (
            StatusCode::OK,
            Json(json!({
                "request_id": request_id,
                "data": resp.data,
                "warnings": if resp.warnings.is_empty() { Value::Null } else { json!(resp.warnings) },
            })),
        )
            .into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => logical_error_response(&err),
    }
}

fn respond_raw(resp: logical::Response) -> Result<Response, LogicalError> {
    let mut data = resp.data;

    let status = data
        .get(HTTP_STATUS_CODE)
        .and_then(Value::as_u64)
        .and_then(|code| u16::try_from(code).ok())
        .and_then(|code| StatusCode::from_u16(code).ok())
        .ok_or_else(|| LogicalError::Internal("cannot decode status code".into()))?;
    let has_body = status != StatusCode::NO_CONTENT;

    let content_type = match data.remove(HTTP_CONTENT_TYPE) {
        Some(Value::String(ct)) => Some(ct),
        Some(_) => return Err(LogicalError::Internal("cannot decode content type".into())),
        None if has_body => return Err(LogicalError::Internal("no content type given".into())),
        None => None,
    };

    let body = match data.remove(HTTP_RAW_BODY) {
        Some(Value::String(body)) if has_body => body,
        Some(Value::String(_)) | None => String::new(),
        Some(_) => return Err(LogicalError::Internal("cannot decode body".into())),
    };

    let mut builder = axum::http::Response::builder().status(status);
    if let Some(ct) = content_type {
        builder = builder.header(header::CONTENT_TYPE, ct);
    }
    match data.remove(HTTP_RAW_CACHE_CONTROL) {
        Some(Value::String(cc)) => builder = builder.header(header::CACHE_CONTROL, cc),
        Some(_) => return Err(LogicalError::Internal("cannot decode cache control".into())),
        None => {}
    }

    builder
        .body(Body::from(body))
        .map_err(|e| LogicalError::Internal(format!("invalid raw response: {}", e)))
}
