//! The mock provider service: compiled interactions plus the invocation log.
//!
//! Interactions are compiled once at construction and immutable afterwards,
//! so concurrent matches require no locking. The invocation log is the only
//! shared mutable state; it is appended under a write lock, and the order of
//! entries across concurrent requests is not guaranteed.

use super::types::{ErrorsBody, Invocation, InvocationOutcome, MockAnswer, MockError};
use crate::config::MockConfig;
use covenant_core::contract::Contract;
use covenant_core::interaction::{ActualRequest, CompiledInteraction, Interaction};
use covenant_core::matcher::{MatchOptions, Mismatch, MismatchReason};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

pub struct MockService {
    options: MatchOptions,
    interactions: Vec<CompiledInteraction>,
    /// Requests actually received, kept for post-test verification.
    invocations: RwLock<Vec<Invocation>>,
    request_count: AtomicU64,
}

impl MockService {
    /// Compile all declared interactions up front. Configuration errors in
    /// any interaction surface here, before a single request is served.
    pub fn new(config: &MockConfig, interactions: Vec<Interaction>) -> Result<Self, MockError> {
        let compiled = interactions
            .into_iter()
            .map(|interaction| {
                let description = interaction.description.clone();
                CompiledInteraction::compile(interaction)
                    .map_err(|source| MockError::Interaction {
                        description,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        info!(interactions = compiled.len(), "mock service ready");
        Ok(Self {
            options: if config.strict {
                MatchOptions::strict()
            } else {
                MatchOptions::default()
            },
            interactions: compiled,
            invocations: RwLock::new(Vec::new()),
            request_count: AtomicU64::new(0),
        })
    }

    /// Serve every interaction of a contract document.
    pub fn from_contract(config: &MockConfig, contract: &Contract) -> Result<Self, MockError> {
        Self::new(config, contract.interactions.clone())
    }

    pub fn interaction_count(&self) -> usize {
        self.interactions.len()
    }

    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Snapshot of the invocation log.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.read().clone()
    }

    /// Decide the response for one request.
    ///
    /// `body` is the raw request body text, if any; it is parsed as JSON
    /// here so that a malformed payload flows through the same mismatch
    /// reporting channel as a shape violation.
    pub fn handle(
        &self,
        method: &str,
        path: &str,
        query: Option<&str>,
        headers: Vec<(String, String)>,
        body: Option<String>,
    ) -> MockAnswer {
        self.request_count.fetch_add(1, Ordering::Relaxed);

        let parsed_body = match body.as_deref().filter(|b| !b.trim().is_empty()) {
            Some(text) => match serde_json::from_str::<Value>(text) {
                Ok(value) => Some(value),
                Err(error) => {
                    warn!(%method, %path, %error, "request body is not valid JSON");
                    let mismatch = Mismatch::new("$.body", MismatchReason::InvalidBody)
                        .actual(Value::String(text.to_string()));
                    return self.refuse(method, path, None, InvocationOutcome::Mismatched(vec![mismatch]));
                }
            },
            None => None,
        };

        let actual = ActualRequest {
            method: method.to_string(),
            path: path.to_string(),
            query: query.map(str::to_string),
            headers,
            body: parsed_body,
        };

        let candidates: Vec<&CompiledInteraction> = self
            .interactions
            .iter()
            .filter(|i| i.is_candidate(method, path))
            .collect();

        if candidates.is_empty() {
            debug!(%method, %path, "no declared interaction for request");
            let mismatch = Mismatch::new("$", MismatchReason::UnrecognizedRequest)
                .actual(Value::String(format!("{method} {path}")));
            return self.refuse(method, path, None, InvocationOutcome::Unrecognized(vec![mismatch]));
        }

        let mut failures: Vec<(&CompiledInteraction, Vec<Mismatch>)> = Vec::new();
        for candidate in candidates {
            let result = candidate.match_request(&actual, &self.options);
            if result.success() {
                debug!(%method, %path, description = candidate.description(), "request matched");
                self.record(Invocation {
                    method: method.to_string(),
                    path: path.to_string(),
                    description: Some(candidate.description().to_string()),
                    outcome: InvocationOutcome::Matched,
                    timestamp: chrono::Utc::now().to_rfc3339(),
                });
                return answer_from(candidate);
            }
            failures.push((candidate, result.mismatches));
        }

        // None of the candidates matched; report the closest one so the
        // consumer's test fails with an actionable diff.
        let (closest, mismatches) = failures
            .into_iter()
            .min_by_key(|(_, m)| m.len())
            .expect("candidates were non-empty");
        debug!(
            %method, %path,
            description = closest.description(),
            mismatches = mismatches.len(),
            "request mismatched"
        );
        self.refuse(
            method,
            path,
            Some(closest.description().to_string()),
            InvocationOutcome::Mismatched(mismatches),
        )
    }

    /// Post-test verification: every declared interaction fired at least
    /// once, and no request went unmatched.
    pub fn verify_all_matched(&self) -> super::types::VerificationReport {
        let invocations = self.invocations.read();
        let never_invoked = self
            .interactions
            .iter()
            .map(|i| i.description().to_string())
            .filter(|description| {
                !invocations.iter().any(|inv| {
                    inv.outcome.is_matched()
                        && inv.description.as_deref() == Some(description.as_str())
                })
            })
            .collect();
        let failed_requests = invocations
            .iter()
            .filter(|inv| !inv.outcome.is_matched())
            .cloned()
            .collect();
        super::types::VerificationReport {
            never_invoked,
            failed_requests,
        }
    }

    fn record(&self, invocation: Invocation) {
        self.invocations.write().push(invocation);
    }

    fn refuse(
        &self,
        method: &str,
        path: &str,
        description: Option<String>,
        outcome: InvocationOutcome,
    ) -> MockAnswer {
        let errors = ErrorsBody {
            errors: outcome.mismatches().to_vec(),
        };
        self.record(Invocation {
            method: method.to_string(),
            path: path.to_string(),
            description,
            outcome,
            timestamp: chrono::Utc::now().to_rfc3339(),
        });
        MockAnswer {
            status: 500,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: serde_json::to_string(&errors).ok(),
        }
    }
}

/// The interaction's configured response, verbatim.
fn answer_from(interaction: &CompiledInteraction) -> MockAnswer {
    let response = &interaction.interaction().response;
    let mut headers: Vec<(String, String)> = response
        .headers
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    let body = response
        .body
        .as_ref()
        .map(|value| serde_json::to_string(value).unwrap_or_default());
    if body.is_some()
        && !headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("content-type"))
    {
        headers.push(("content-type".to_string(), "application/json".to_string()));
    }
    MockAnswer {
        status: response.status,
        headers,
        body,
    }
}
