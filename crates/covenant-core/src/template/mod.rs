//! The template model: an immutable tagged-variant tree describing an
//! expected JSON body.
//!
//! Templates are produced by the fluent builder in [`builder`] and consumed
//! by the compiler. A node's field name is not stored on the node itself; the
//! builder carries it as a pending name that is resolved when the node is
//! attached under an object, which keeps builder calls order-independent.

mod builder;

pub use builder::{array, like, like_datetime, like_guid, like_regex, literal, object, ArrayTemplate};

use serde_json::Value;

/// Configuration errors in a template, reported when the template is
/// compiled, never surfaced to a live request.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("array template has no element; call .of(...) or .in_which_every_element_is(...)")]
    ArrayWithoutElement,
    #[error("object child at {0} has no name; call .named(...) before attaching it")]
    UnnamedObjectChild(String),
    #[error("object at {0} declares member {1:?} more than once")]
    DuplicateMember(String, String),
    #[error("invalid regex pattern {pattern:?} at {path}: {source}")]
    InvalidRegex {
        path: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// The variants of a template node.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateKind {
    /// The actual value must match exactly.
    Literal(Value),
    /// The actual value must have the same JSON kind as the example.
    Matched(Value),
    /// The actual value must be a string fully matching the pattern; the
    /// example is only used for rendering.
    Regexed { example: Value, pattern: String },
    /// An array of elements described by one element template.
    ///
    /// `element` is `None` only for a misconfigured builder; the compiler
    /// rejects that case. `wildcard` means every element is constrained by
    /// the element template, not just index 0.
    Array {
        element: Option<Box<Template>>,
        min: Option<u64>,
        wildcard: bool,
    },
    /// An object with named children, insertion order preserved for example
    /// rendering.
    Object(Vec<Template>),
}

/// A template node plus its builder-carried pending name.
///
/// Immutable once built; every builder call returns a new value.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    pub(crate) name: Option<String>,
    pub(crate) kind: TemplateKind,
}

impl Template {
    pub(crate) fn unnamed(kind: TemplateKind) -> Self {
        Self { name: None, kind }
    }

    /// Set the field name used when this node is attached under an object.
    ///
    /// Order-independent: may be called at any point in the builder chain,
    /// and carries no semantic weight until attachment.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// The pending field name, if one was set.
    pub fn pending_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The node variant.
    pub fn kind(&self) -> &TemplateKind {
        &self.kind
    }
}
