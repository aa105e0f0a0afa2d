//! Field schemas and typed access to request data.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::logical::LogicalError;

/// Declared type of a request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Int,
    Bool,
    CommaStringSlice,
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: FieldType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldSchema {
    pub fn new(kind: FieldType, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
            default: None,
        }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    /// Coerce a raw value to this field's type.
    fn coerce(&self, name: &str, raw: &Value) -> Result<Value, LogicalError> {
        let mismatch = || {
            LogicalError::InvalidRequest(format!(
                "field {:?} could not be parsed as {:?}: {}",
                name, self.kind, raw
            ))
        };

        match self.kind {
            FieldType::String => match raw {
                Value::String(_) => Ok(raw.clone()),
                Value::Number(n) => Ok(Value::String(n.to_string())),
                Value::Bool(b) => Ok(Value::String(b.to_string())),
                _ => Err(mismatch()),
            },
            FieldType::Int => match raw {
                Value::Number(n) if n.is_i64() => Ok(raw.clone()),
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::from)
                    .map_err(|_| mismatch()),
                _ => Err(mismatch()),
            },
            FieldType::Bool => match raw {
                Value::Bool(_) => Ok(raw.clone()),
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(Value::Bool(true)),
                    "false" | "0" => Ok(Value::Bool(false)),
                    _ => Err(mismatch()),
                },
                Value::Number(n) => match n.as_i64() {
                    Some(1) => Ok(Value::Bool(true)),
                    Some(0) => Ok(Value::Bool(false)),
                    _ => Err(mismatch()),
                },
                _ => Err(mismatch()),
            },
            FieldType::CommaStringSlice => match raw {
                Value::String(s) => Ok(Value::Array(
                    s.split(',')
                        .map(str::trim)
                        .filter(|part| !part.is_empty())
                        .map(|part| Value::String(part.to_string()))
                        .collect(),
                )),
                Value::Array(items) => items
                    .iter()
                    .map(|item| match item {
                        Value::String(_) => Ok(item.clone()),
                        Value::Number(n) => Ok(Value::String(n.to_string())),
                        _ => Err(mismatch()),
                    })
                    .collect::<Result<Vec<_>, _>>()
                    .map(Value::Array),
                _ => Err(mismatch()),
            },
        }
    }

    fn zero_value(&self) -> Value {
        match self.kind {
            FieldType::String => Value::String(String::new()),
            FieldType::Int => Value::from(0),
            FieldType::Bool => Value::Bool(false),
            FieldType::CommaStringSlice => Value::Array(Vec::new()),
        }
    }
}

/// Raw request data paired with the schema of the path it was routed to.
#[derive(Debug, Clone, Default)]
pub struct FieldData {
    raw: Map<String, Value>,
    schema: BTreeMap<String, FieldSchema>,
}

impl FieldData {
    pub fn new(raw: Map<String, Value>, schema: BTreeMap<String, FieldSchema>) -> Self {
        Self { raw, schema }
    }

    /// Typed value of a declared field, falling back to its default or zero value.
    pub fn get(&self, name: &str) -> Result<Value, LogicalError> {
        let schema = self.schema_for(name)?;
        match self.raw.get(name) {
            Some(raw) => schema.coerce(name, raw),
            None => Ok(schema
                .default
                .clone()
                .unwrap_or_else(|| schema.zero_value())),
        }
    }

    /// Typed value of a declared field, `None` when the request did not supply it.
    pub fn get_ok(&self, name: &str) -> Result<Option<Value>, LogicalError> {
        let schema = self.schema_for(name)?;
        self.raw
            .get(name)
            .map(|raw| schema.coerce(name, raw))
            .transpose()
    }

    /// Check that every supplied declared field parses as its type.
    ///
    /// Undeclared fields are ignored.
    pub fn validate(&self) -> Result<(), LogicalError> {
        for (name, raw) in &self.raw {
            if let Some(schema) = self.schema.get(name) {
                schema.coerce(name, raw)?;
            }
        }
        Ok(())
    }

    /// Supplied fields the path does not declare.
    pub fn unknown_fields(&self) -> Vec<&str> {
        self.raw
            .keys()
            .filter(|k| !self.schema.contains_key(k.as_str()))
            .map(String::as_str)
            .collect()
    }

    fn schema_for(&self, name: &str) -> Result<&FieldSchema, LogicalError> {
        self.schema.get(name).ok_or_else(|| {
            LogicalError::InvalidRequest(format!("field {:?} is not declared on this path", name))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> BTreeMap<String, FieldSchema> {
        let mut schema = BTreeMap::new();
        schema.insert("name".into(), FieldSchema::new(FieldType::String, "Role name"));
        schema.insert(
            "ttl".into(),
            FieldSchema::new(FieldType::Int, "Token TTL").with_default(300),
        );
        schema.insert("verbose".into(), FieldSchema::new(FieldType::Bool, "Verbose"));
        schema.insert(
            "audiences".into(),
            FieldSchema::new(FieldType::CommaStringSlice, "Bound audiences"),
        );
        schema
    }

    fn data(raw: Value) -> FieldData {
        let Value::Object(map) = raw else { panic!("object expected") };
        FieldData::new(map, schema())
    }

    #[test]
    fn test_defaults_and_zero_values() {
        let d = data(json!({}));
        assert_eq!(d.get("ttl").unwrap(), json!(300));
        assert_eq!(d.get("name").unwrap(), json!(""));
        assert_eq!(d.get_ok("name").unwrap(), None);
    }

    #[test]
    fn test_coercion_from_query_strings() {
        let d = data(json!({
            "ttl": "60",
            "verbose": "true",
            "audiences": "a, b,,c",
            "name": 42
        }));
        assert_eq!(d.get("ttl").unwrap(), json!(60));
        assert_eq!(d.get("verbose").unwrap(), json!(true));
        assert_eq!(d.get("audiences").unwrap(), json!(["a", "b", "c"]));
        assert_eq!(d.get("name").unwrap(), json!("42"));
        assert!(d.validate().is_ok());
    }

    #[test]
    fn test_invalid_value_fails_validation() {
        let d = data(json!({ "ttl": "soon" }));
        assert!(matches!(d.validate(), Err(LogicalError::InvalidRequest(_))));
        assert!(d.get("ttl").is_err());
    }

    #[test]
    fn test_undeclared_fields() {
        let d = data(json!({ "extra": 1 }));
        assert!(d.validate().is_ok());
        assert_eq!(d.unknown_fields(), vec!["extra"]);
        assert!(d.get("extra").is_err());
    }
}
