//! Logical response returned by a backend.
//!
//! A response carrying `HTTP_STATUS_CODE` is rendered verbatim by the
//! transport instead of being wrapped in the JSON data envelope.

use serde::Serialize;
use serde_json::{Map, Value};

/// HTTP status code of a raw response (integer).
pub const HTTP_STATUS_CODE: &str = "http_status_code";
/// Body of a raw response (string).
pub const HTTP_RAW_BODY: &str = "http_raw_body";
/// `Content-Type` of a raw response (string).
pub const HTTP_CONTENT_TYPE: &str = "http_content_type";
/// Optional `Cache-Control` of a raw response (string).
pub const HTTP_RAW_CACHE_CONTROL: &str = "http_raw_cache_control";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Response {
    pub data: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl Response {
    pub fn with_data(data: Map<String, Value>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
        }
    }

    /// Builds a response the transport passes through as-is.
    pub fn raw_http(status: u16, content_type: &str, body: impl Into<String>) -> Self {
        let mut data = Map::new();
        data.insert(HTTP_STATUS_CODE.to_string(), Value::from(status));
        data.insert(HTTP_RAW_BODY.to_string(), Value::String(body.into()));
        data.insert(
            HTTP_CONTENT_TYPE.to_string(),
            Value::String(content_type.to_string()),
        );
        Self::with_data(data)
    }

    pub fn is_raw(&self) -> bool {
        self.data.contains_key(HTTP_STATUS_CODE)
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}
