//! Header matching: the body algorithm over a flat key space.
//!
//! Header expectations live under the `$.headers.` prefix in the same rule
//! set as the body rules. Header names compare case-insensitively; extra
//! actual headers are always ignored.

use super::outcome::{Mismatch, MismatchReason};
use super::ruleset::CompiledRuleSet;
use crate::path::DocPath;
use crate::rules::MatcherType;
use serde_json::Value;
use std::collections::HashMap;

/// Match actual headers against the expected set, appending any mismatches.
pub fn match_headers(
    actual: &[(String, String)],
    expected: &HashMap<String, String>,
    rules: &CompiledRuleSet,
    out: &mut Vec<Mismatch>,
) {
    for (name, expected_value) in expected {
        let path = DocPath::headers().member(name.clone());
        let actual_value = actual
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str());

        let Some(actual_value) = actual_value else {
            out.push(
                Mismatch::new(path.to_string(), MismatchReason::MissingHeader)
                    .expected(Value::String(expected_value.clone())),
            );
            continue;
        };

        match rules.get_exact(&path.to_string()) {
            Some(rule) => match rule.match_type {
                MatcherType::Regex => {
                    let matches = rule
                        .regex
                        .as_deref()
                        .is_some_and(|regex| regex.is_match(actual_value));
                    if !matches {
                        out.push(
                            Mismatch::new(path.to_string(), MismatchReason::RegexMismatch)
                                .expected(Value::String(expected_value.clone()))
                                .actual(Value::String(actual_value.to_string())),
                        );
                    }
                }
                // Header values are always strings; a type rule leaves the
                // value unconstrained.
                MatcherType::Type => {}
            },
            None => {
                if actual_value != expected_value {
                    out.push(
                        Mismatch::new(path.to_string(), MismatchReason::ValueMismatch)
                            .expected(Value::String(expected_value.clone()))
                            .actual(Value::String(actual_value.to_string())),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{MatchingRule, RuleSet};

    fn compiled(entries: &[(&str, MatchingRule)]) -> CompiledRuleSet {
        let rules: RuleSet = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        CompiledRuleSet::compile(&rules).unwrap()
    }

    fn expected(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn actual(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_exact_header_match_is_case_insensitive_on_names() {
        let mut out = Vec::new();
        match_headers(
            &actual(&[("content-type", "application/json")]),
            &expected(&[("Content-Type", "application/json")]),
            &CompiledRuleSet::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }

    #[test]
    fn test_missing_header_is_reported_with_prefixed_path() {
        let mut out = Vec::new();
        match_headers(
            &actual(&[]),
            &expected(&[("Accept", "application/json")]),
            &CompiledRuleSet::default(),
            &mut out,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].path, "$.headers.Accept");
        assert_eq!(out[0].reason, MismatchReason::MissingHeader);
    }

    #[test]
    fn test_value_mismatch_without_rule() {
        let mut out = Vec::new();
        match_headers(
            &actual(&[("Accept", "text/plain")]),
            &expected(&[("Accept", "application/json")]),
            &CompiledRuleSet::default(),
            &mut out,
        );
        assert_eq!(out[0].reason, MismatchReason::ValueMismatch);
    }

    #[test]
    fn test_regex_rule_governs_header_value() {
        let rules = compiled(&[(
            "$.headers.Accept",
            MatchingRule::regex("application/.*"),
        )]);
        let mut out = Vec::new();
        match_headers(
            &actual(&[("Accept", "application/xml")]),
            &expected(&[("Accept", "application/json")]),
            &rules,
            &mut out,
        );
        assert!(out.is_empty());

        match_headers(
            &actual(&[("Accept", "text/plain")]),
            &expected(&[("Accept", "application/json")]),
            &rules,
            &mut out,
        );
        assert_eq!(out[0].reason, MismatchReason::RegexMismatch);
    }

    #[test]
    fn test_extra_actual_headers_are_ignored() {
        let mut out = Vec::new();
        match_headers(
            &actual(&[("Accept", "application/json"), ("X-Extra", "1")]),
            &expected(&[("Accept", "application/json")]),
            &CompiledRuleSet::default(),
            &mut out,
        );
        assert!(out.is_empty());
    }
}
