//! Recursive body matching.
//!
//! The walk consults the rule set at every step. A `type` rule compares JSON
//! kinds and ignores the concrete value; a `regex` rule requires a string
//! fully matching the stored pattern; absence of a rule means deep structural
//! equality with the expected example at that path.

use super::outcome::{MatchResult, Mismatch, MismatchReason};
use super::ruleset::CompiledRuleSet;
use super::MatchOptions;
use crate::kind::JsonKind;
use crate::path::DocPath;
use crate::rules::MatcherType;
use serde_json::Value;

/// Match an actual body against an expected example under a rule set,
/// starting at `$.body`.
pub fn match_body(
    actual: &Value,
    expected: &Value,
    rules: &CompiledRuleSet,
    options: &MatchOptions,
) -> MatchResult {
    let mut mismatches = Vec::new();
    match_value(
        actual,
        expected,
        &DocPath::body(),
        rules,
        options,
        &mut mismatches,
    );
    MatchResult { mismatches }
}

fn match_value(
    actual: &Value,
    expected: &Value,
    path: &DocPath,
    rules: &CompiledRuleSet,
    options: &MatchOptions,
    out: &mut Vec<Mismatch>,
) {
    if let Some(rule) = rules.resolve(path) {
        match rule.match_type {
            MatcherType::Regex => {
                let Some(regex) = rule.regex.as_deref() else {
                    // A regex rule without a pattern cannot be satisfied.
                    out.push(
                        Mismatch::new(path.to_string(), MismatchReason::RegexMismatch)
                            .actual(actual.clone()),
                    );
                    return;
                };
                match actual {
                    Value::String(s) if regex.is_match(s) => {}
                    _ => out.push(
                        Mismatch::new(path.to_string(), MismatchReason::RegexMismatch)
                            .expected(Value::String(regex.as_str().to_string()))
                            .actual(actual.clone()),
                    ),
                }
                return;
            }
            MatcherType::Type => {
                let expected_kind = JsonKind::of(expected);
                let actual_kind = JsonKind::of(actual);
                if actual_kind != expected_kind {
                    out.push(
                        Mismatch::new(path.to_string(), MismatchReason::KindMismatch)
                            .expected(Value::String(expected_kind.to_string()))
                            .actual(Value::String(actual_kind.to_string())),
                    );
                    return;
                }
                // A type rule carrying an array minimum is an array-level
                // cardinality rule; the element walk continues below. Any
                // other type rule is decided by kind alone.
                if let (Value::Array(actual_items), Value::Array(expected_items)) =
                    (actual, expected)
                {
                    if rule.min.is_some() {
                        match_array(
                            actual_items,
                            expected_items,
                            rule.min,
                            path,
                            rules,
                            options,
                            out,
                        );
                    }
                }
                return;
            }
        }
    }

    match (actual, expected) {
        (Value::Object(actual_members), Value::Object(expected_members)) => {
            for (name, expected_value) in expected_members {
                let member_path = path.member(name);
                match actual_members.get(name) {
                    Some(actual_value) => match_value(
                        actual_value,
                        expected_value,
                        &member_path,
                        rules,
                        options,
                        out,
                    ),
                    None => out.push(
                        Mismatch::new(member_path.to_string(), MismatchReason::MissingMember)
                            .expected(expected_value.clone()),
                    ),
                }
            }
            if options.strict {
                for (name, actual_value) in actual_members {
                    if !expected_members.contains_key(name) {
                        out.push(
                            Mismatch::new(
                                path.member(name).to_string(),
                                MismatchReason::UnexpectedMember,
                            )
                            .actual(actual_value.clone()),
                        );
                    }
                }
            }
        }
        (Value::Array(actual_items), Value::Array(expected_items)) => {
            match_array(actual_items, expected_items, None, path, rules, options, out);
        }
        _ => {
            let expected_kind = JsonKind::of(expected);
            let actual_kind = JsonKind::of(actual);
            if actual_kind != expected_kind {
                out.push(
                    Mismatch::new(path.to_string(), MismatchReason::KindMismatch)
                        .expected(Value::String(expected_kind.to_string()))
                        .actual(Value::String(actual_kind.to_string())),
                );
            } else if actual != expected {
                out.push(
                    Mismatch::new(path.to_string(), MismatchReason::ValueMismatch)
                        .expected(expected.clone())
                        .actual(actual.clone()),
                );
            }
        }
    }
}

fn match_array(
    actual: &[Value],
    expected: &[Value],
    min: Option<u64>,
    path: &DocPath,
    rules: &CompiledRuleSet,
    options: &MatchOptions,
    out: &mut Vec<Mismatch>,
) {
    let wildcard = rules.get_exact(&path.wildcard().to_string()).is_some();

    if let Some(min) = min {
        if (actual.len() as u64) < min {
            out.push(
                Mismatch::new(path.to_string(), MismatchReason::MinimumNotMet)
                    .expected(Value::from(min))
                    .actual(Value::from(actual.len() as u64)),
            );
            return;
        }
    } else if actual.len() < expected.len() {
        out.push(
            Mismatch::new(path.to_string(), MismatchReason::LengthMismatch)
                .expected(Value::from(expected.len() as u64))
                .actual(Value::from(actual.len() as u64)),
        );
        return;
    }

    if options.strict && actual.len() > expected.len() && !wildcard {
        out.push(
            Mismatch::new(path.to_string(), MismatchReason::LengthMismatch)
                .expected(Value::from(expected.len() as u64))
                .actual(Value::from(actual.len() as u64)),
        );
        return;
    }

    if wildcard {
        // Every element is constrained by the wildcard rule; the element
        // example is the canonical one at index 0.
        let Some(element_expected) = expected.first() else {
            return;
        };
        for (i, actual_value) in actual.iter().enumerate() {
            match_value(
                actual_value,
                element_expected,
                &path.index(i),
                rules,
                options,
                out,
            );
        }
    } else {
        // Only the indices the example declares are checked.
        for (i, expected_value) in expected.iter().enumerate() {
            if let Some(actual_value) = actual.get(i) {
                match_value(actual_value, expected_value, &path.index(i), rules, options, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::compile;
    use crate::template::{array, like, like_regex, literal, object, Template};
    use serde_json::json;

    fn run(template: &Template, actual: Value) -> MatchResult {
        run_with(template, actual, &MatchOptions::default())
    }

    fn run_with(template: &Template, actual: Value, options: &MatchOptions) -> MatchResult {
        let compiled = compile(template).unwrap();
        let rules = CompiledRuleSet::compile(&compiled.rules).unwrap();
        match_body(&actual, &compiled.example, &rules, options)
    }

    #[test]
    fn test_example_always_matches_itself() {
        let template = object([
            like("Hello").named("greeting"),
            literal(7).named("count"),
            array().named("xs").containing_at_least(2).of(like(1)),
        ]);
        let compiled = compile(&template).unwrap();
        let result = run(&template, compiled.example.clone());
        assert!(result.success(), "mismatches: {:?}", result.mismatches);
    }

    #[test]
    fn test_type_rule_accepts_same_kind_different_value() {
        let result = run(&like("Hello world"), json!("Goodbye"));
        assert!(result.success());
    }

    #[test]
    fn test_type_rule_rejects_different_kind_citing_path() {
        let result = run(&like("Hello world"), json!(42));
        assert!(!result.success());
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].path, "$.body");
        assert_eq!(result.mismatches[0].reason, MismatchReason::KindMismatch);
    }

    #[test]
    fn test_literal_requires_exact_value() {
        let template = object([literal("Hello").named("greeting")]);
        assert!(run(&template, json!({"greeting": "Hello"})).success());

        let result = run(&template, json!({"greeting": "Goodbye"}));
        assert_eq!(result.mismatches[0].path, "$.body.greeting");
        assert_eq!(result.mismatches[0].reason, MismatchReason::ValueMismatch);
    }

    #[test]
    fn test_missing_member_is_reported_at_member_path() {
        let template = object([like(1).named("id"), like("x").named("name")]);
        let result = run(&template, json!({"id": 9}));
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].path, "$.body.name");
        assert_eq!(result.mismatches[0].reason, MismatchReason::MissingMember);
    }

    #[test]
    fn test_extra_members_ignored_by_default() {
        let template = object([like(1).named("id")]);
        let result = run(&template, json!({"id": 2, "extra": true}));
        assert!(result.success());
    }

    #[test]
    fn test_extra_members_rejected_in_strict_mode() {
        let template = object([like(1).named("id")]);
        let result = run_with(
            &template,
            json!({"id": 2, "extra": true}),
            &MatchOptions::strict(),
        );
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].path, "$.body.extra");
        assert_eq!(
            result.mismatches[0].reason,
            MismatchReason::UnexpectedMember
        );
    }

    #[test]
    fn test_regex_rule_requires_full_match() {
        let template = like_regex("Hello world", "Hello.*");
        assert!(run(&template, json!("Hello there")).success());

        let result = run(&template, json!("Say Hello"));
        assert_eq!(result.mismatches[0].reason, MismatchReason::RegexMismatch);
    }

    #[test]
    fn test_regex_rule_rejects_non_strings() {
        let template = like_regex("Hello world", "Hello.*");
        let result = run(&template, json!(5));
        assert_eq!(result.mismatches[0].reason, MismatchReason::RegexMismatch);
        assert_eq!(result.mismatches[0].path, "$.body");
    }

    #[test]
    fn test_min_violation_cites_array_path() {
        let template = object([array()
            .named("a")
            .containing_at_least(2)
            .of(like("x"))]);
        let result = run(&template, json!({"a": ["y"]}));
        assert!(!result.success());
        assert_eq!(result.mismatches[0].path, "$.body.a");
        assert_eq!(result.mismatches[0].reason, MismatchReason::MinimumNotMet);
    }

    #[test]
    fn test_min_array_applies_element_rule_beyond_index_zero() {
        let template = object([array()
            .named("a")
            .containing_at_least(2)
            .of(like("x"))]);
        // Both elements only need to be strings.
        assert!(run(&template, json!({"a": ["alpha", "beta", "gamma"]})).success());

        let result = run(&template, json!({"a": ["alpha", 3]}));
        assert_eq!(result.mismatches[0].path, "$.body.a[1]");
        assert_eq!(result.mismatches[0].reason, MismatchReason::KindMismatch);
    }

    #[test]
    fn test_wildcard_array_checks_every_element() {
        let template = object([array()
            .named("xs")
            .in_which_every_element_is(like(1))]);
        assert!(run(&template, json!({"xs": [5, 6, 7]})).success());

        let result = run(&template, json!({"xs": [5, "six", 7]}));
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].path, "$.body.xs[1]");
    }

    #[test]
    fn test_wildcard_array_enforces_default_minimum() {
        let template = object([array()
            .named("xs")
            .in_which_every_element_is(like(1))]);
        let result = run(&template, json!({"xs": []}));
        assert_eq!(result.mismatches[0].path, "$.body.xs");
        assert_eq!(result.mismatches[0].reason, MismatchReason::MinimumNotMet);
    }

    #[test]
    fn test_wildcard_over_literal_element_requires_exact_elements() {
        let template = object([array()
            .named("xs")
            .in_which_every_element_is(literal("x"))]);
        assert!(run(&template, json!({"xs": ["x"]})).success());

        // No wildcard rule was emitted; unmatched indices beyond the example
        // fall outside the walk, and declared indices compare exactly.
        let result = run(&template, json!({"xs": ["y"]}));
        assert_eq!(result.mismatches[0].path, "$.body.xs[0]");
        assert_eq!(result.mismatches[0].reason, MismatchReason::ValueMismatch);
    }

    #[test]
    fn test_literal_array_allows_longer_actual_by_default() {
        let template = object([array().named("xs").of(literal(1))]);
        assert!(run(&template, json!({"xs": [1, 2, 3]})).success());

        let result = run(&template, json!({"xs": []}));
        assert_eq!(result.mismatches[0].reason, MismatchReason::LengthMismatch);
    }

    #[test]
    fn test_strict_mode_rejects_extra_array_elements() {
        let template = object([array().named("xs").of(literal(1))]);
        let result = run_with(&template, json!({"xs": [1, 2]}), &MatchOptions::strict());
        assert_eq!(result.mismatches[0].reason, MismatchReason::LengthMismatch);
    }

    #[test]
    fn test_matched_object_is_kind_only() {
        let template = like(json!({"a": 1}));
        assert!(run(&template, json!({"totally": "different"})).success());
        assert!(!run(&template, json!([1])).success());
    }

    #[test]
    fn test_nested_rules_apply_under_objects() {
        let template = object([object([
            like(1).named("id"),
            literal("fixed").named("tag"),
        ])
        .named("order")]);
        let result = run(
            &template,
            json!({"order": {"id": 99, "tag": "wrong"}}),
        );
        assert_eq!(result.mismatches.len(), 1);
        assert_eq!(result.mismatches[0].path, "$.body.order.tag");
    }

    #[test]
    fn test_wildcard_object_elements_check_nested_members() {
        let template = object([array()
            .named("orders")
            .in_which_every_element_is(object([like(7).named("id")]))]);
        // Nested rules live at index 0; repeated indices resolve to them.
        assert!(run(
            &template,
            json!({"orders": [{"id": 1}, {"id": 2}]})
        )
        .success());
    }
}
