//! Fluent construction API for body templates.
//!
//! All operations are pure and side-effect free: each call consumes its
//! receiver and returns a new value, so partially-applied builders can be
//! shared and reused freely.

use super::{Template, TemplateKind};
use crate::regex_constants;
use serde_json::Value;

/// A value that must match exactly.
pub fn literal(value: impl Into<Value>) -> Template {
    Template::unnamed(TemplateKind::Literal(value.into()))
}

/// A value constrained only by its JSON kind; `value` doubles as the
/// rendered example.
pub fn like(value: impl Into<Value>) -> Template {
    Template::unnamed(TemplateKind::Matched(value.into()))
}

/// A string constrained by a regex pattern; `example` is only used for the
/// rendered example body.
pub fn like_regex(example: impl Into<Value>, pattern: impl Into<String>) -> Template {
    Template::unnamed(TemplateKind::Regexed {
        example: example.into(),
        pattern: pattern.into(),
    })
}

/// A string constrained by the canonical GUID pattern.
pub fn like_guid(example: impl Into<String>) -> Template {
    like_regex(Value::String(example.into()), regex_constants::GUID)
}

/// A string constrained by the canonical ISO-8601 date-time pattern.
pub fn like_datetime(example: impl Into<String>) -> Template {
    like_regex(Value::String(example.into()), regex_constants::DATE_TIME)
}

/// Start an array template. Supply the element with [`ArrayTemplate::of`] or
/// [`ArrayTemplate::in_which_every_element_is`].
pub fn array() -> ArrayTemplate {
    ArrayTemplate {
        name: None,
        min: None,
    }
}

/// An object with named children. Each child must carry a pending name
/// (via `.named(...)`); attaching an unnamed child is a configuration error
/// reported when the template is compiled.
pub fn object(children: impl IntoIterator<Item = Template>) -> Template {
    Template::unnamed(TemplateKind::Object(children.into_iter().collect()))
}

/// Builder for array templates.
///
/// Default cardinality has no minimum rule; `containing_at_least` sets an
/// explicit minimum, and `in_which_every_element_is` switches to wildcard
/// semantics where every element, not just index 0, is constrained.
#[derive(Debug, Clone)]
pub struct ArrayTemplate {
    name: Option<String>,
    min: Option<u64>,
}

impl ArrayTemplate {
    /// Set the field name used at object attachment. Order-independent with
    /// the other modifiers.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Require at least `n` elements.
    pub fn containing_at_least(mut self, n: u64) -> Self {
        self.min = Some(n);
        self
    }

    /// Set the element template; only index 0 is constrained by it unless a
    /// wildcard modifier is used.
    pub fn of(self, element: Template) -> Template {
        Template {
            name: self.name,
            kind: TemplateKind::Array {
                element: Some(Box::new(element)),
                min: self.min,
                wildcard: false,
            },
        }
    }

    /// Set the element template with wildcard semantics: every element is
    /// constrained by it. The minimum defaults to 1 unless
    /// `containing_at_least` was combined.
    pub fn in_which_every_element_is(self, element: Template) -> Template {
        Template {
            name: self.name,
            kind: TemplateKind::Array {
                element: Some(Box::new(element)),
                min: self.min,
                wildcard: true,
            },
        }
    }
}

// An array builder that never received an element still converts into a
// template so it can be attached anywhere; the compiler reports it as a
// configuration error.
impl From<ArrayTemplate> for Template {
    fn from(builder: ArrayTemplate) -> Self {
        Template {
            name: builder.name,
            kind: TemplateKind::Array {
                element: None,
                min: builder.min,
                wildcard: false,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_modifiers_compose_in_any_order() {
        let a = array().containing_at_least(2).named("xs").of(like(1));
        let b = array().named("xs").containing_at_least(2).of(like(1));
        assert_eq!(a, b);
    }

    #[test]
    fn test_wildcard_keeps_explicit_minimum() {
        let t = array().containing_at_least(3).in_which_every_element_is(like("x"));
        match t.kind() {
            TemplateKind::Array { min, wildcard, .. } => {
                assert_eq!(*min, Some(3));
                assert!(*wildcard);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_elementless_array_converts_to_template() {
        let t: Template = array().named("broken").into();
        match t.kind() {
            TemplateKind::Array { element, .. } => assert!(element.is_none()),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn test_guid_and_datetime_use_canonical_patterns() {
        match like_guid("e5dfa73c-4398-440a-8094-69e61326f7f9").kind() {
            TemplateKind::Regexed { pattern, .. } => {
                assert_eq!(pattern, crate::regex_constants::GUID);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        match like_datetime("2020-06-01T13:05:30").kind() {
            TemplateKind::Regexed { pattern, .. } => {
                assert_eq!(pattern, crate::regex_constants::DATE_TIME);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
