//! Match verdicts and per-path diagnostics.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Why an actual value failed to satisfy the expectation at a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MismatchReason {
    /// No declared interaction matched the request's method and path.
    UnrecognizedRequest,
    /// The actual value's JSON kind differs from the expected kind.
    KindMismatch,
    /// Same kind, different value, at a path compared by equality.
    ValueMismatch,
    /// The actual value is not a string fully matching the rule's pattern.
    RegexMismatch,
    /// An expected object member is absent from the actual value.
    MissingMember,
    /// The actual value carries a member the expectation does not declare
    /// (strict mode only).
    UnexpectedMember,
    /// The actual array is shorter than the rule's minimum.
    MinimumNotMet,
    /// The actual array length does not satisfy the expected element count.
    LengthMismatch,
    /// An expected header is absent.
    MissingHeader,
    /// The response status differs from the expectation.
    StatusMismatch,
    /// The request query string differs from the expectation.
    QueryMismatch,
    /// A body was expected but the request carried none.
    MissingBody,
    /// The body could not be parsed as JSON.
    InvalidBody,
}

impl fmt::Display for MismatchReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            MismatchReason::UnrecognizedRequest => "unrecognized request",
            MismatchReason::KindMismatch => "JSON kind differs",
            MismatchReason::ValueMismatch => "value differs",
            MismatchReason::RegexMismatch => "string does not match pattern",
            MismatchReason::MissingMember => "expected member is missing",
            MismatchReason::UnexpectedMember => "unexpected member",
            MismatchReason::MinimumNotMet => "array minimum not met",
            MismatchReason::LengthMismatch => "array length differs",
            MismatchReason::MissingHeader => "expected header is missing",
            MismatchReason::StatusMismatch => "status differs",
            MismatchReason::QueryMismatch => "query differs",
            MismatchReason::MissingBody => "expected body is missing",
            MismatchReason::InvalidBody => "body is not valid JSON",
        };
        f.write_str(text)
    }
}

/// One per-path diagnostic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mismatch {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual: Option<Value>,
    pub reason: MismatchReason,
}

impl Mismatch {
    pub fn new(path: impl Into<String>, reason: MismatchReason) -> Self {
        Self {
            path: path.into(),
            expected: None,
            actual: None,
            reason,
        }
    }

    pub fn expected(mut self, value: impl Into<Value>) -> Self {
        self.expected = Some(value.into());
        self
    }

    pub fn actual(mut self, value: impl Into<Value>) -> Self {
        self.actual = Some(value.into());
        self
    }

    /// One-line rendering for reports and logs.
    pub fn describe(&self) -> String {
        match (&self.expected, &self.actual) {
            (Some(e), Some(a)) => {
                format!("{}: {} (expected {e}, got {a})", self.path, self.reason)
            }
            (Some(e), None) => format!("{}: {} (expected {e})", self.path, self.reason),
            (None, Some(a)) => format!("{}: {} (got {a})", self.path, self.reason),
            (None, None) => format!("{}: {}", self.path, self.reason),
        }
    }
}

/// Verdict of one match run: success iff the mismatch list is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub mismatches: Vec<Mismatch>,
}

impl MatchResult {
    pub fn success(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn merge(&mut self, other: MatchResult) {
        self.mismatches.extend(other.mismatches);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_result_is_success() {
        assert!(MatchResult::default().success());
    }

    #[test]
    fn test_mismatch_serializes_camel_case() {
        let m = Mismatch::new("$.body.x", MismatchReason::KindMismatch)
            .expected(json!("a"))
            .actual(json!(1));
        let v = serde_json::to_value(&m).unwrap();
        assert_eq!(v["reason"], json!("kindMismatch"));
        assert_eq!(v["path"], json!("$.body.x"));
    }

    #[test]
    fn test_describe_names_path_and_reason() {
        let m = Mismatch::new("$.body.a", MismatchReason::MinimumNotMet)
            .expected(json!(2))
            .actual(json!(1));
        let text = m.describe();
        assert!(text.contains("$.body.a"));
        assert!(text.contains("minimum not met"));
    }
}
