//! Pre-compiled rule sets.
//!
//! Regex rules are compiled once, when an interaction is compiled, so the
//! per-request hot path never builds a regex. A rule's pattern must match the
//! whole actual string, so patterns are anchored on compilation.

use crate::path::{DocPath, Segment};
use crate::rules::{MatcherType, RuleSet};
use crate::template::TemplateError;
use regex::Regex;
use std::collections::HashMap;
use std::sync::Arc;

/// One rule, with its regex pre-compiled.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub match_type: MatcherType,
    pub regex: Option<Arc<Regex>>,
    pub min: Option<u64>,
}

/// A rule set with all regexes compiled up front.
#[derive(Debug, Clone, Default)]
pub struct CompiledRuleSet {
    rules: HashMap<String, CompiledRule>,
}

impl CompiledRuleSet {
    /// Compile every rule in `rules`. A malformed pattern is a configuration
    /// error, reported here rather than at matching time.
    pub fn compile(rules: &RuleSet) -> Result<Self, TemplateError> {
        let mut compiled = HashMap::with_capacity(rules.len());
        for (path, rule) in rules {
            let regex = match &rule.regex {
                Some(pattern) => {
                    let anchored = format!("^(?:{pattern})$");
                    let regex =
                        Regex::new(&anchored).map_err(|source| TemplateError::InvalidRegex {
                            path: path.clone(),
                            pattern: pattern.clone(),
                            source,
                        })?;
                    Some(Arc::new(regex))
                }
                None => None,
            };
            compiled.insert(
                path.clone(),
                CompiledRule {
                    match_type: rule.match_type,
                    regex,
                    min: rule.min,
                },
            );
        }
        Ok(Self { rules: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Look up a rule by its exact textual path.
    pub fn get_exact(&self, path: &str) -> Option<&CompiledRule> {
        self.rules.get(path)
    }

    /// Resolve the rule governing a concrete document location.
    ///
    /// The compiler only ever emits element rules at index 0 or at the
    /// wildcard segment, while actual arrays are walked at concrete indices,
    /// so resolution tries, in order: the exact path, the path with its last
    /// index as `[*]`, the path with every index as `[0]`, and the latter
    /// with its last index as `[*]`.
    pub fn resolve(&self, path: &DocPath) -> Option<&CompiledRule> {
        if let Some(rule) = self.rules.get(&path.to_string()) {
            return Some(rule);
        }
        if !path
            .segments()
            .iter()
            .any(|s| matches!(s, Segment::Index(_)))
        {
            return None;
        }

        for candidate in [
            replace_indices(path, false, true),
            replace_indices(path, true, false),
            replace_indices(path, true, true),
        ] {
            if let Some(rule) = self.rules.get(&candidate.to_string()) {
                return Some(rule);
            }
        }
        None
    }
}

/// Rewrite index segments: `zero` maps every index to 0, `wildcard_last`
/// turns the last index segment into `[*]`.
fn replace_indices(path: &DocPath, zero: bool, wildcard_last: bool) -> DocPath {
    let mut segments: Vec<Segment> = path.segments().to_vec();
    if zero {
        for segment in segments.iter_mut() {
            if let Segment::Index(i) = segment {
                *i = 0;
            }
        }
    }
    if wildcard_last {
        if let Some(last_index) = segments
            .iter()
            .rposition(|s| matches!(s, Segment::Index(_)))
        {
            segments[last_index] = Segment::Wildcard;
        }
    }
    DocPath::from_parts(path.root(), segments)
}
