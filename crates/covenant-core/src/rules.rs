//! Path-indexed matching rules.
//!
//! A rule set is the compiled form of a body template: a mapping from path
//! strings to rules, with unique keys by construction. The absence of a rule
//! at a path means "compare by deep value equality" at matching time.
//!
//! The persisted form is exactly the V2 contract-document shape:
//! `{"match": "type" | "regex", "regex": <string?>, "min": <integer?>}`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How a rule constrains the actual value at its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatcherType {
    /// Same JSON kind as the expected example; concrete value unconstrained.
    Type,
    /// Actual value must be a string fully matching the stored pattern.
    Regex,
}

/// One matching rule, keyed by a path string in a [`RuleSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingRule {
    #[serde(rename = "match")]
    pub match_type: MatcherType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regex: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<u64>,
}

impl MatchingRule {
    /// A plain type rule.
    pub fn type_match() -> Self {
        Self {
            match_type: MatcherType::Type,
            regex: None,
            min: None,
        }
    }

    /// A type rule carrying an array minimum.
    pub fn type_with_min(min: u64) -> Self {
        Self {
            match_type: MatcherType::Type,
            regex: None,
            min: Some(min),
        }
    }

    /// A regex rule.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            match_type: MatcherType::Regex,
            regex: Some(pattern.into()),
            min: None,
        }
    }
}

/// Compiled rule set: path string -> rule, unique keys, deterministic order.
pub type RuleSet = BTreeMap<String, MatchingRule>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_type_rule_serializes_to_persisted_form() {
        let rule = MatchingRule::type_match();
        assert_eq!(serde_json::to_value(&rule).unwrap(), json!({"match": "type"}));
    }

    #[test]
    fn test_regex_rule_serializes_to_persisted_form() {
        let rule = MatchingRule::regex("Hello.*");
        assert_eq!(
            serde_json::to_value(&rule).unwrap(),
            json!({"match": "regex", "regex": "Hello.*"})
        );
    }

    #[test]
    fn test_min_rule_round_trips() {
        let rule = MatchingRule::type_with_min(2);
        let text = serde_json::to_string(&rule).unwrap();
        let back: MatchingRule = serde_json::from_str(&text).unwrap();
        assert_eq!(back, rule);
        assert_eq!(back.min, Some(2));
    }

    #[test]
    fn test_rule_set_deserializes_from_document_fragment() {
        let fragment = json!({
            "$.body": {"match": "type"},
            "$.body.anArray": {"match": "type", "min": 1},
            "$.body.anArray[*]": {"match": "type"}
        });
        let rules: RuleSet = serde_json::from_value(fragment).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules["$.body.anArray"].min, Some(1));
    }
}
