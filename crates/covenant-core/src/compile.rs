//! The rule compiler: walks a template tree and emits a path-indexed rule
//! set plus a concrete example value tree.
//!
//! Compilation happens once per declared interaction; the derived rule set
//! and example are cached alongside the interaction for the lifetime of the
//! test run. All configuration errors in a template surface here, before any
//! request is served.

use crate::path::DocPath;
use crate::rules::{MatchingRule, RuleSet};
use crate::template::{Template, TemplateError, TemplateKind};
use regex::Regex;
use serde_json::Value;
use tracing::debug;

/// The compiled form of a body template.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    /// Concrete example body, rendered from the template's example values.
    pub example: Value,
    /// Path-indexed matching rules; keys are unique by construction.
    pub rules: RuleSet,
}

/// Compile a body template, rooted at `$.body`.
pub fn compile(template: &Template) -> Result<Compiled, TemplateError> {
    let mut rules = RuleSet::new();
    let example = compile_node(template, &DocPath::body(), &mut rules)?;
    debug!(rules = rules.len(), "compiled body template");
    Ok(Compiled { example, rules })
}

fn compile_node(
    template: &Template,
    path: &DocPath,
    rules: &mut RuleSet,
) -> Result<Value, TemplateError> {
    match template.kind() {
        TemplateKind::Literal(value) => Ok(value.clone()),
        TemplateKind::Matched(value) => {
            rules.insert(path.to_string(), MatchingRule::type_match());
            Ok(value.clone())
        }
        TemplateKind::Regexed { example, pattern } => {
            // Reject bad patterns here so a misconfigured template can never
            // reach a live request.
            Regex::new(pattern).map_err(|source| TemplateError::InvalidRegex {
                path: path.to_string(),
                pattern: pattern.clone(),
                source,
            })?;
            rules.insert(path.to_string(), MatchingRule::regex(pattern.clone()));
            Ok(example.clone())
        }
        TemplateKind::Array {
            element,
            min,
            wildcard,
        } => {
            let element = element.as_deref().ok_or(TemplateError::ArrayWithoutElement)?;

            let element_path = path.index(0);
            let mut element_rules = RuleSet::new();
            let element_example = compile_node(element, &element_path, &mut element_rules)?;

            if *wildcard {
                // The rule the element contributed at its own path moves to
                // the wildcard path; a rule-less element (a literal) emits no
                // wildcard rule, and exact element-wise matching applies.
                if let Some(rule) = element_rules.remove(&element_path.to_string()) {
                    rules.insert(path.wildcard().to_string(), rule);
                }
                rules.append(&mut element_rules);
                rules.insert(
                    path.to_string(),
                    MatchingRule::type_with_min(min.unwrap_or(1)),
                );
            } else {
                rules.append(&mut element_rules);
                if let Some(min) = min {
                    rules.insert(path.to_string(), MatchingRule::type_with_min(*min));
                }
            }

            let repeat = min.unwrap_or(1).max(1) as usize;
            Ok(Value::Array(vec![element_example; repeat]))
        }
        TemplateKind::Object(children) => {
            let mut members = serde_json::Map::new();
            for child in children {
                let name = child
                    .pending_name()
                    .ok_or_else(|| TemplateError::UnnamedObjectChild(path.to_string()))?;
                if members.contains_key(name) {
                    return Err(TemplateError::DuplicateMember(
                        path.to_string(),
                        name.to_string(),
                    ));
                }
                let child_example = compile_node(child, &path.member(name), rules)?;
                members.insert(name.to_string(), child_example);
            }
            Ok(Value::Object(members))
        }
    }
}
