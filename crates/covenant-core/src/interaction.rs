//! One expected request/response pair declared by a consumer.
//!
//! An [`Interaction`] is the document form: concrete example values plus
//! path-indexed matching rules, exactly as persisted in the contract file.
//! [`InteractionBuilder`], [`RequestTemplate`] and [`ResponseTemplate`] build
//! that form from body templates; [`CompiledInteraction`] carries the
//! pre-compiled rule sets used on the hot path.

use crate::compile::compile;
use crate::matcher::{
    match_body, match_headers, CompiledRuleSet, MatchOptions, MatchResult, Mismatch,
    MismatchReason,
};
use crate::path::DocPath;
use crate::rules::{MatchingRule, RuleSet};
use crate::template::{Template, TemplateError};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Errors from assembling an interaction.
#[derive(Debug, thiserror::Error)]
pub enum InteractionError {
    #[error("interaction {0:?} has no request")]
    MissingRequest(String),
    #[error("interaction {0:?} has no response")]
    MissingResponse(String),
    #[error(transparent)]
    Template(#[from] TemplateError),
}

/// The expected request half of an interaction, in document form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    pub method: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "RuleSet::is_empty")]
    pub matching_rules: RuleSet,
}

/// The provided response half of an interaction, in document form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionResponse {
    pub status: u16,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
    #[serde(default, skip_serializing_if = "RuleSet::is_empty")]
    pub matching_rules: RuleSet,
}

/// One expected request/response pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_state: Option<String>,
    pub request: InteractionRequest,
    pub response: InteractionResponse,
}

/// An actual incoming request, reduced to the fields the matcher consults.
#[derive(Debug, Clone, Default)]
pub struct ActualRequest {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// An actual provider response, as observed by the verifier.
#[derive(Debug, Clone)]
pub struct ActualResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Value>,
}

/// An interaction with its rule sets compiled once, cached for the lifetime
/// of the test run. Immutable after compilation, so concurrent matches need
/// no locking.
#[derive(Debug, Clone)]
pub struct CompiledInteraction {
    interaction: Interaction,
    request_rules: CompiledRuleSet,
    response_rules: CompiledRuleSet,
}

impl CompiledInteraction {
    /// Compile both rule sets; a malformed pattern fails here, before any
    /// request is served.
    pub fn compile(interaction: Interaction) -> Result<Self, TemplateError> {
        let request_rules = CompiledRuleSet::compile(&interaction.request.matching_rules)?;
        let response_rules = CompiledRuleSet::compile(&interaction.response.matching_rules)?;
        Ok(Self {
            interaction,
            request_rules,
            response_rules,
        })
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn description(&self) -> &str {
        &self.interaction.description
    }

    /// Whether this interaction is a candidate for the request: method and
    /// path compare by exact string equality.
    pub fn is_candidate(&self, method: &str, path: &str) -> bool {
        self.interaction.request.method.eq_ignore_ascii_case(method)
            && self.interaction.request.path == path
    }

    /// Match an actual request against the expected one.
    pub fn match_request(&self, actual: &ActualRequest, options: &MatchOptions) -> MatchResult {
        let expected = &self.interaction.request;
        let mut result = MatchResult::default();

        if !expected.method.eq_ignore_ascii_case(&actual.method) {
            result.mismatches.push(
                Mismatch::new("method", MismatchReason::ValueMismatch)
                    .expected(expected.method.clone())
                    .actual(actual.method.clone()),
            );
        }
        if expected.path != actual.path {
            result.mismatches.push(
                Mismatch::new("path", MismatchReason::ValueMismatch)
                    .expected(expected.path.clone())
                    .actual(actual.path.clone()),
            );
        }
        if let Some(expected_query) = &expected.query {
            let actual_query = actual.query.as_deref().unwrap_or("");
            if expected_query != actual_query {
                result.mismatches.push(
                    Mismatch::new("query", MismatchReason::QueryMismatch)
                        .expected(expected_query.clone())
                        .actual(actual_query.to_string()),
                );
            }
        }

        match_headers(
            &actual.headers,
            &expected.headers,
            &self.request_rules,
            &mut result.mismatches,
        );

        if let Some(expected_body) = &expected.body {
            match &actual.body {
                Some(actual_body) => result.merge(match_body(
                    actual_body,
                    expected_body,
                    &self.request_rules,
                    options,
                )),
                None => result.mismatches.push(
                    Mismatch::new(
                        DocPath::body().to_string(),
                        MismatchReason::MissingBody,
                    )
                    .expected(expected_body.clone()),
                ),
            }
        }

        result
    }

    /// Match an actual provider response against the expected one (provider
    /// verification uses the same matching primitive as the mock).
    pub fn match_response(&self, actual: &ActualResponse, options: &MatchOptions) -> MatchResult {
        let expected = &self.interaction.response;
        let mut result = MatchResult::default();

        if expected.status != actual.status {
            result.mismatches.push(
                Mismatch::new("status", MismatchReason::StatusMismatch)
                    .expected(expected.status)
                    .actual(actual.status),
            );
        }

        match_headers(
            &actual.headers,
            &expected.headers,
            &self.response_rules,
            &mut result.mismatches,
        );

        if let Some(expected_body) = &expected.body {
            match &actual.body {
                Some(actual_body) => result.merge(match_body(
                    actual_body,
                    expected_body,
                    &self.response_rules,
                    options,
                )),
                None => result.mismatches.push(
                    Mismatch::new(
                        DocPath::body().to_string(),
                        MismatchReason::MissingBody,
                    )
                    .expected(expected_body.clone()),
                ),
            }
        }

        result
    }
}

/// Builder for the request half: literal headers, rule-aware headers, and a
/// body template, compiled into document form by [`InteractionBuilder::build`].
#[derive(Debug, Clone)]
pub struct RequestTemplate {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
    header_patterns: Vec<(String, String)>,
    body: Option<Template>,
}

impl RequestTemplate {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            query: None,
            headers: Vec::new(),
            header_patterns: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new("GET", path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new("POST", path)
    }

    pub fn put(path: impl Into<String>) -> Self {
        Self::new("PUT", path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new("DELETE", path)
    }

    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Expect a header with this exact value.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Expect a header whose value fully matches `pattern`; `example` is the
    /// value rendered into the contract document.
    pub fn header_matching(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.header_patterns.push((name.clone(), pattern.into()));
        self.headers.push((name, example.into()));
        self
    }

    /// Expect a JSON body described by a template.
    pub fn body(mut self, template: Template) -> Self {
        self.body = Some(template);
        self
    }

    fn build(self) -> Result<InteractionRequest, TemplateError> {
        let (body, mut matching_rules) = compile_optional_body(self.body.as_ref())?;
        append_header_rules(&self.header_patterns, &mut matching_rules)?;
        Ok(InteractionRequest {
            method: self.method,
            path: self.path,
            query: self.query,
            headers: self.headers.into_iter().collect(),
            body,
            matching_rules,
        })
    }
}

/// Builder for the response half.
#[derive(Debug, Clone)]
pub struct ResponseTemplate {
    status: u16,
    headers: Vec<(String, String)>,
    header_patterns: Vec<(String, String)>,
    body: Option<Template>,
}

impl ResponseTemplate {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            header_patterns: Vec::new(),
            body: None,
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn created() -> Self {
        Self::new(201)
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_matching(
        mut self,
        name: impl Into<String>,
        pattern: impl Into<String>,
        example: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.header_patterns.push((name.clone(), pattern.into()));
        self.headers.push((name, example.into()));
        self
    }

    pub fn body(mut self, template: Template) -> Self {
        self.body = Some(template);
        self
    }

    fn build(self) -> Result<InteractionResponse, TemplateError> {
        let (body, mut matching_rules) = compile_optional_body(self.body.as_ref())?;
        append_header_rules(&self.header_patterns, &mut matching_rules)?;
        Ok(InteractionResponse {
            status: self.status,
            headers: self.headers.into_iter().collect(),
            body,
            matching_rules,
        })
    }
}

fn compile_optional_body(
    template: Option<&Template>,
) -> Result<(Option<Value>, RuleSet), TemplateError> {
    match template {
        Some(template) => {
            let compiled = compile(template)?;
            Ok((Some(compiled.example), compiled.rules))
        }
        None => Ok((None, RuleSet::new())),
    }
}

fn append_header_rules(
    patterns: &[(String, String)],
    rules: &mut RuleSet,
) -> Result<(), TemplateError> {
    for (name, pattern) in patterns {
        let path = DocPath::headers().member(name.clone()).to_string();
        Regex::new(pattern).map_err(|source| TemplateError::InvalidRegex {
            path: path.clone(),
            pattern: pattern.clone(),
            source,
        })?;
        rules.insert(path, MatchingRule::regex(pattern.clone()));
    }
    Ok(())
}

/// Fluent entry point for declaring an interaction.
#[derive(Debug, Clone)]
pub struct InteractionBuilder {
    description: String,
    provider_state: Option<String>,
    request: Option<RequestTemplate>,
    response: Option<ResponseTemplate>,
}

impl InteractionBuilder {
    /// Start an interaction named by what the consumer is asking for.
    pub fn upon_receiving(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            provider_state: None,
            request: None,
            response: None,
        }
    }

    /// The provider state this interaction assumes.
    pub fn given(mut self, provider_state: impl Into<String>) -> Self {
        self.provider_state = Some(provider_state.into());
        self
    }

    pub fn with_request(mut self, request: RequestTemplate) -> Self {
        self.request = Some(request);
        self
    }

    pub fn will_respond_with(mut self, response: ResponseTemplate) -> Self {
        self.response = Some(response);
        self
    }

    /// Compile templates into the document form.
    pub fn build(self) -> Result<Interaction, InteractionError> {
        let request = self
            .request
            .ok_or_else(|| InteractionError::MissingRequest(self.description.clone()))?;
        let response = self
            .response
            .ok_or_else(|| InteractionError::MissingResponse(self.description.clone()))?;
        Ok(Interaction {
            description: self.description,
            provider_state: self.provider_state,
            request: request.build()?,
            response: response.build()?,
        })
    }
}
