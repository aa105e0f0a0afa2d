//! Logical operation taxonomy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Operation requested on a backend path.
///
/// Distinct from raw HTTP verbs; the transport owns the verb mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Read,
    Write,
    Delete,
    List,
    /// Framework-handled; returns path documentation instead of invoking a handler.
    Help,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Help => "help",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "read" => Ok(Operation::Read),
            "write" | "create" | "update" => Ok(Operation::Write),
            "delete" => Ok(Operation::Delete),
            "list" => Ok(Operation::List),
            "help" => Ok(Operation::Help),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}
