//! Logical request handed to a backend.

use serde_json::{Map, Value};

use crate::logical::{Context, Operation};

/// One call into a backend, created per incoming request by the transport.
#[derive(Debug, Clone)]
pub struct Request {
    pub operation: Operation,
    /// Path relative to the backend's mount point, without a leading slash.
    pub path: String,
    /// Raw field data; typed access goes through `FieldData`.
    pub data: Map<String, Value>,
    pub context: Context,
    pub request_id: String,
    pub mount_point: String,
}

impl Request {
    pub fn new(operation: Operation, path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            operation,
            path: path.trim_start_matches('/').to_string(),
            data: Map::new(),
            context: Context::background(),
            request_id: String::new(),
            mount_point: String::new(),
        }
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_context(mut self, context: Context) -> Self {
        self.context = context;
        self
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = request_id.into();
        self
    }

    pub fn with_mount_point(mut self, mount_point: impl Into<String>) -> Self {
        self.mount_point = mount_point.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_is_mount_relative() {
        let req = Request::new(Operation::Read, "/ui");
        assert_eq!(req.path, "ui");
        assert!(req.data.is_empty());
    }
}
