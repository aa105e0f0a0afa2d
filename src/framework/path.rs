//! Path descriptors: a route pattern bound to per-operation handlers.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use serde::Serialize;

use crate::framework::{FieldData, FieldSchema, FrameworkError, PathPattern};
use crate::logical::{Context, LogicalError, Operation, Request, Response};

/// Future returned by an operation handler.
pub type OperationFuture = BoxFuture<'static, Result<Option<Response>, LogicalError>>;

/// Handler invoked for one operation on a matched path.
pub type OperationFunc = Arc<dyn Fn(Context, Request, FieldData) -> OperationFuture + Send + Sync>;

/// Wrap an async function as an `OperationFunc`.
pub fn operation_fn<F, Fut>(f: F) -> OperationFunc
where
    F: Fn(Context, Request, FieldData) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Response>, LogicalError>> + Send + 'static,
{
    Arc::new(
        move |ctx: Context, req: Request, data: FieldData| -> OperationFuture {
            Box::pin(f(ctx, req, data))
        },
    )
}

/// Metadata used only for generated documentation and UIs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisplayAttributes {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_prefix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_verb: Option<String>,
}

impl DisplayAttributes {
    pub fn new(prefix: impl Into<String>, verb: impl Into<String>) -> Self {
        Self {
            operation_prefix: Some(prefix.into()),
            operation_verb: Some(verb.into()),
        }
    }

    /// Generated operation id, e.g. `jwt-ui`.
    pub fn operation_id(&self) -> Option<String> {
        match (&self.operation_prefix, &self.operation_verb) {
            (Some(prefix), Some(verb)) => Some(format!("{}-{}", prefix, verb)),
            (None, Some(verb)) => Some(verb.clone()),
            (Some(prefix), None) => Some(prefix.clone()),
            (None, None) => None,
        }
    }
}

/// Immutable route declaration consumed by `Backend`.
pub struct Path {
    pattern: PathPattern,
    display_attrs: Option<DisplayAttributes>,
    operations: HashMap<Operation, OperationFunc>,
    fields: BTreeMap<String, FieldSchema>,
    help_synopsis: String,
    help_description: String,
}

impl Path {
    pub fn builder(pattern: &str) -> PathBuilder {
        PathBuilder {
            pattern: pattern.to_string(),
            display_attrs: None,
            operations: Vec::new(),
            fields: BTreeMap::new(),
            help_synopsis: String::new(),
            help_description: String::new(),
        }
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn display_attrs(&self) -> Option<&DisplayAttributes> {
        self.display_attrs.as_ref()
    }

    pub fn fields(&self) -> &BTreeMap<String, FieldSchema> {
        &self.fields
    }

    pub fn handler(&self, operation: Operation) -> Option<&OperationFunc> {
        self.operations.get(&operation)
    }

    /// Supported operations, sorted.
    pub fn operations(&self) -> Vec<Operation> {
        let mut ops: Vec<_> = self.operations.keys().copied().collect();
        ops.sort();
        ops
    }

    pub fn help_synopsis(&self) -> &str {
        &self.help_synopsis
    }

    pub fn help_description(&self) -> &str {
        &self.help_description
    }
}

impl fmt::Debug for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Path")
            .field("pattern", &self.pattern.as_str())
            .field("display_attrs", &self.display_attrs)
            .field("operations", &self.operations())
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .finish()
    }
}

pub struct PathBuilder {
    pattern: String,
    display_attrs: Option<DisplayAttributes>,
    operations: Vec<(Operation, OperationFunc)>,
    fields: BTreeMap<String, FieldSchema>,
    help_synopsis: String,
    help_description: String,
}

impl PathBuilder {
    pub fn display_attrs(mut self, attrs: DisplayAttributes) -> Self {
        self.display_attrs = Some(attrs);
        self
    }

    pub fn operation(mut self, operation: Operation, handler: OperationFunc) -> Self {
        self.operations.push((operation, handler));
        self
    }

    pub fn field(mut self, name: impl Into<String>, schema: FieldSchema) -> Self {
        self.fields.insert(name.into(), schema);
        self
    }

    pub fn help(mut self, synopsis: impl Into<String>, description: impl Into<String>) -> Self {
        self.help_synopsis = synopsis.into();
        self.help_description = description.into();
        self
    }

    /// Compile the pattern and freeze the descriptor.
    ///
    /// Fails on an invalid pattern, a second handler for the same operation,
    /// a handler for `help`, or a capture with no matching field.
    pub fn build(self) -> Result<Path, FrameworkError> {
        let pattern = PathPattern::parse(&self.pattern)?;

        let mut operations = HashMap::with_capacity(self.operations.len());
        for (operation, handler) in self.operations {
            if operation == Operation::Help {
                return Err(FrameworkError::ReservedOperation {
                    pattern: self.pattern,
                    operation,
                });
            }
            if operations.insert(operation, handler).is_some() {
                return Err(FrameworkError::DuplicateOperation {
                    pattern: self.pattern,
                    operation,
                });
            }
        }

        if let Some(capture) = pattern.captures().find(|c| !self.fields.contains_key(*c)) {
            return Err(FrameworkError::UndeclaredCapture {
                pattern: self.pattern.clone(),
                capture: capture.to_string(),
            });
        }

        Ok(Path {
            pattern,
            display_attrs: self.display_attrs,
            operations,
            fields: self.fields,
            help_synopsis: self.help_synopsis,
            help_description: self.help_description,
        })
    }
}
