//! Route pattern compilation and matching.
//!
//! # Responsibilities
//! - Compile a route expression (`ui$`, `role/{name}$`, `login`) once
//! - Match mount-relative request paths against it
//! - Bind named segment captures into request data
//!
//! # Design Decisions
//! - Leading anchor is implicit; trailing `$` means exact match, otherwise prefix
//! - Captures match one non-empty run within a single segment, extending to
//!   the last occurrence of the following literal in that segment
//! - Matching is case-sensitive
//! - No regex to guarantee O(n) matching

use std::fmt;

use serde_json::{Map, Value};

use crate::framework::FrameworkError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Literal(String),
    Capture(String),
}

/// A compiled route expression.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    tokens: Vec<Token>,
    anchored: bool,
}

impl PathPattern {
    /// Compile a route expression.
    pub fn parse(source: &str) -> Result<Self, FrameworkError> {
        let invalid = |reason: &str| FrameworkError::InvalidPattern {
            pattern: source.to_string(),
            reason: reason.to_string(),
        };

        let body = source.strip_prefix('^').unwrap_or(source);
        let (body, anchored) = match body.strip_suffix('$') {
            Some(rest) => (rest, true),
            None => (body, false),
        };

        if body.is_empty() && !anchored {
            return Err(invalid("pattern is empty"));
        }
        if body.contains('$') {
            return Err(invalid("'$' is only allowed at the end"));
        }

        let mut tokens = Vec::new();
        let mut literal = String::new();
        let mut chars = body.chars();
        while let Some(c) = chars.next() {
            match c {
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        if !(n.is_ascii_alphanumeric() || n == '_') {
                            return Err(invalid("capture names are [A-Za-z0-9_]+"));
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(invalid("unbalanced '{'"));
                    }
                    if name.is_empty() {
                        return Err(invalid("empty capture name"));
                    }
                    if !literal.is_empty() {
                        tokens.push(Token::Literal(std::mem::take(&mut literal)));
                    } else if matches!(tokens.last(), Some(Token::Capture(_))) {
                        return Err(invalid("adjacent captures need a separator"));
                    }
                    tokens.push(Token::Capture(name));
                }
                '}' => return Err(invalid("unbalanced '}'")),
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            tokens.push(Token::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            tokens,
            anchored,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Names of the segment captures, in order.
    pub fn captures(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().filter_map(|t| match t {
            Token::Capture(name) => Some(name.as_str()),
            Token::Literal(_) => None,
        })
    }

    /// Returns the captured segments if `path` matches.
    pub fn matches(&self, path: &str) -> Option<Map<String, Value>> {
        let mut captured = Map::new();
        let mut rest = path;

        for (i, token) in self.tokens.iter().enumerate() {
            match token {
                Token::Literal(lit) => {
                    rest = rest.strip_prefix(lit.as_str())?;
                }
                Token::Capture(name) => {
                    let segment_end = rest.find('/').unwrap_or(rest.len());
                    let end = match self.tokens.get(i + 1) {
                        Some(Token::Literal(next)) => rest[..segment_end]
                            .rfind(next.as_str())
                            .or_else(|| next.starts_with('/').then_some(segment_end))?,
                        _ => segment_end,
                    };
                    if end == 0 {
                        return None;
                    }
                    captured.insert(name.clone(), Value::String(rest[..end].to_string()));
                    rest = &rest[end..];
                }
            }
        }

        if self.anchored && !rest.is_empty() {
            return None;
        }
        Some(captured)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
