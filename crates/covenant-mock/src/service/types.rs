//! Type definitions for the mock provider service.

use bytes::Bytes;
use covenant_core::matcher::Mismatch;
use covenant_core::template::TemplateError;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Errors from configuring or starting the mock service.
#[derive(Debug, thiserror::Error)]
pub enum MockError {
    #[error("failed to bind {host}:{port}: {source}")]
    Bind {
        host: String,
        port: u16,
        #[source]
        source: std::io::Error,
    },
    #[error("interaction {description:?} is misconfigured: {source}")]
    Interaction {
        description: String,
        #[source]
        source: TemplateError,
    },
}

/// How one recorded request played out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InvocationOutcome {
    /// The request satisfied a declared interaction.
    Matched,
    /// The request selected a candidate but failed its shape checks.
    Mismatched(Vec<Mismatch>),
    /// No declared interaction matched the request's method and path.
    Unrecognized(Vec<Mismatch>),
}

impl InvocationOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, InvocationOutcome::Matched)
    }

    pub fn mismatches(&self) -> &[Mismatch] {
        match self {
            InvocationOutcome::Matched => &[],
            InvocationOutcome::Mismatched(m) | InvocationOutcome::Unrecognized(m) => m,
        }
    }
}

/// One recorded request, kept for post-test verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invocation {
    pub method: String,
    pub path: String,
    /// Description of the matched (or closest-candidate) interaction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub outcome: InvocationOutcome,
    pub timestamp: String,
}

/// The response the service decided on, independent of the HTTP host.
#[derive(Debug, Clone, PartialEq)]
pub struct MockAnswer {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

/// Diagnostic envelope returned for mismatched and unrecognized requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorsBody {
    pub errors: Vec<Mismatch>,
}

/// Outcome of the post-test check that every declared interaction fired and
/// every request matched.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    /// Interactions that were declared but never invoked.
    pub never_invoked: Vec<String>,
    /// Requests that arrived but did not match any interaction.
    pub failed_requests: Vec<Invocation>,
}

impl VerificationReport {
    pub fn success(&self) -> bool {
        self.never_invoked.is_empty() && self.failed_requests.is_empty()
    }

    /// Multi-line rendering for test failure output.
    pub fn describe(&self) -> String {
        if self.success() {
            return "all expected interactions were invoked and matched".to_string();
        }
        let mut lines = Vec::new();
        for description in &self.never_invoked {
            lines.push(format!("never invoked: {description}"));
        }
        for invocation in &self.failed_requests {
            lines.push(format!(
                "failed request: {} {}",
                invocation.method, invocation.path
            ));
            for mismatch in invocation.outcome.mismatches() {
                lines.push(format!("  {}", mismatch.describe()));
            }
        }
        lines.join("\n")
    }
}

/// Build a plain response with a body.
pub fn build_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| Response::new(Full::new(Bytes::new())))
}

/// Build a JSON response with the given headers applied first.
pub fn build_response_with_headers<'a>(
    status: StatusCode,
    headers: impl IntoIterator<Item = (&'a str, &'a str)>,
    body: impl Into<Bytes>,
) -> Response<Full<Bytes>> {
    let mut response = Response::builder().status(status);
    for (name, value) in headers {
        response = response.header(name, value);
    }
    response
        .body(Full::new(body.into()))
        .unwrap_or_else(|_| build_response(StatusCode::INTERNAL_SERVER_ERROR, "response build error"))
}
