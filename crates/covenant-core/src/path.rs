//! Canonical textual encoding of JSON locations.
//!
//! A path starts at a root (`$.body` or `$.headers`) and appends segments
//! left-to-right: object members as `.name`, array indices as `[i]`, and the
//! array wildcard as `[*]`. This is the narrow grammar the rule set is keyed
//! by; it is not a general JSONPath implementation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root of a document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathRoot {
    Body,
    Headers,
}

impl PathRoot {
    fn as_str(&self) -> &'static str {
        match self {
            PathRoot::Body => "$.body",
            PathRoot::Headers => "$.headers",
        }
    }
}

/// One path segment below the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Object member access (`.name`).
    Member(String),
    /// Array index access (`[i]`).
    Index(usize),
    /// Array wildcard (`[*]`), applying to every element.
    Wildcard,
}

/// An owned path into a JSON document.
///
/// Paths are cheap to extend; every navigation step in the compiler and the
/// matcher derives a child path from its parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocPath {
    root: PathRoot,
    segments: Vec<Segment>,
}

/// Errors from parsing a textual path.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path must start with $.body or $.headers: {0}")]
    InvalidRoot(String),
    #[error("unexpected character {1:?} at offset {0}")]
    UnexpectedChar(usize, char),
    #[error("unterminated bracket segment at offset {0}")]
    UnterminatedBracket(usize),
    #[error("invalid array index {0:?}")]
    InvalidIndex(String),
}

impl DocPath {
    /// The body root, `$.body`.
    pub fn body() -> Self {
        Self {
            root: PathRoot::Body,
            segments: Vec::new(),
        }
    }

    /// The header root, `$.headers`.
    pub fn headers() -> Self {
        Self {
            root: PathRoot::Headers,
            segments: Vec::new(),
        }
    }

    /// Assemble a path from parts.
    pub fn from_parts(root: PathRoot, segments: Vec<Segment>) -> Self {
        Self { root, segments }
    }

    pub fn root(&self) -> PathRoot {
        self.root
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Derive the path of an object member.
    pub fn member(&self, name: impl Into<String>) -> Self {
        self.push(Segment::Member(name.into()))
    }

    /// Derive the path of an array index.
    pub fn index(&self, i: usize) -> Self {
        self.push(Segment::Index(i))
    }

    /// Derive the wildcard path of an array.
    pub fn wildcard(&self) -> Self {
        self.push(Segment::Wildcard)
    }

    fn push(&self, segment: Segment) -> Self {
        let mut segments = Vec::with_capacity(self.segments.len() + 1);
        segments.extend(self.segments.iter().cloned());
        segments.push(segment);
        Self {
            root: self.root,
            segments,
        }
    }

    /// Parse the textual form.
    ///
    /// Grammar: root (`.identifier` | `[uint]` | `[*]`)*.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let (root, mut rest_offset) = if let Some(stripped) = input.strip_prefix("$.body") {
            (PathRoot::Body, input.len() - stripped.len())
        } else if let Some(stripped) = input.strip_prefix("$.headers") {
            (PathRoot::Headers, input.len() - stripped.len())
        } else {
            return Err(PathError::InvalidRoot(input.to_string()));
        };

        let mut segments = Vec::new();
        let bytes = input.as_bytes();
        while rest_offset < bytes.len() {
            match bytes[rest_offset] {
                b'.' => {
                    let start = rest_offset + 1;
                    let mut end = start;
                    while end < bytes.len() && bytes[end] != b'.' && bytes[end] != b'[' {
                        end += 1;
                    }
                    if end == start {
                        return Err(PathError::UnexpectedChar(rest_offset, '.'));
                    }
                    segments.push(Segment::Member(input[start..end].to_string()));
                    rest_offset = end;
                }
                b'[' => {
                    let close = input[rest_offset..]
                        .find(']')
                        .map(|i| rest_offset + i)
                        .ok_or(PathError::UnterminatedBracket(rest_offset))?;
                    let inner = &input[rest_offset + 1..close];
                    if inner == "*" {
                        segments.push(Segment::Wildcard);
                    } else {
                        let index = inner
                            .parse::<usize>()
                            .map_err(|_| PathError::InvalidIndex(inner.to_string()))?;
                        segments.push(Segment::Index(index));
                    }
                    rest_offset = close + 1;
                }
                other => {
                    return Err(PathError::UnexpectedChar(rest_offset, other as char));
                }
            }
        }

        Ok(Self { root, segments })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.root.as_str())?;
        for segment in &self.segments {
            match segment {
                Segment::Member(name) => write!(f, ".{name}")?,
                Segment::Index(i) => write!(f, "[{i}]")?,
                Segment::Wildcard => f.write_str("[*]")?,
            }
        }
        Ok(())
    }
}
