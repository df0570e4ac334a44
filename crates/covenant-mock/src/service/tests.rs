//! Tests for the mock service decision logic.
//!
//! These exercise `MockService::handle` directly, without the HTTP host:
//! candidate selection, rule-aware body matching, diagnostics, the
//! invocation log, and post-test verification.

use super::*;
use crate::config::MockConfig;
use covenant_core::interaction::{Interaction, InteractionBuilder, RequestTemplate, ResponseTemplate};
use covenant_core::matcher::MismatchReason;
use covenant_core::template::{array, like, like_guid, literal, object};
use serde_json::{json, Value};

fn greeting_interaction() -> Interaction {
    InteractionBuilder::upon_receiving("a request to create a greeting")
        .with_request(
            RequestTemplate::post("/greetings")
                .body(object([like("Hello world").named("greeting")])),
        )
        .will_respond_with(
            ResponseTemplate::created()
                .header("Content-Type", "application/json")
                .body(object([
                    like_guid("e5dfa73c-4398-440a-8094-69e61326f7f9").named("id"),
                    like("Hello world").named("greeting"),
                ])),
        )
        .build()
        .unwrap()
}

fn listing_interaction() -> Interaction {
    InteractionBuilder::upon_receiving("a request to list greetings")
        .with_request(RequestTemplate::get("/greetings"))
        .will_respond_with(
            ResponseTemplate::ok().body(object([array()
                .named("greetings")
                .containing_at_least(2)
                .of(like("Hello world"))])),
        )
        .build()
        .unwrap()
}

fn service(interactions: Vec<Interaction>) -> MockService {
    MockService::new(&MockConfig::default(), interactions).unwrap()
}

fn post_json(service: &MockService, path: &str, body: Value) -> MockAnswer {
    service.handle(
        "POST",
        path,
        None,
        vec![("content-type".to_string(), "application/json".to_string())],
        Some(body.to_string()),
    )
}

fn errors_of(answer: &MockAnswer) -> ErrorsBody {
    serde_json::from_str(answer.body.as_deref().unwrap()).unwrap()
}

#[test]
fn test_matching_request_returns_configured_response_verbatim() {
    let service = service(vec![greeting_interaction()]);
    let answer = post_json(&service, "/greetings", json!({"greeting": "Hi there"}));

    assert_eq!(answer.status, 201);
    assert!(answer
        .headers
        .iter()
        .any(|(k, v)| k.eq_ignore_ascii_case("content-type") && v == "application/json"));
    let body: Value = serde_json::from_str(answer.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["greeting"], json!("Hello world"));
    assert_eq!(body["id"], json!("e5dfa73c-4398-440a-8094-69e61326f7f9"));
}

#[test]
fn test_kind_mismatch_yields_diagnostic_citing_path() {
    let service = service(vec![greeting_interaction()]);
    let answer = post_json(&service, "/greetings", json!({"greeting": 42}));

    assert_eq!(answer.status, 500);
    let errors = errors_of(&answer);
    assert_eq!(errors.errors.len(), 1);
    assert_eq!(errors.errors[0].path, "$.body.greeting");
    assert_eq!(errors.errors[0].reason, MismatchReason::KindMismatch);
}

#[test]
fn test_unrecognized_request_is_a_distinct_mismatch_kind() {
    let service = service(vec![greeting_interaction()]);
    let answer = service.handle("DELETE", "/somewhere-else", None, Vec::new(), None);

    assert_eq!(answer.status, 500);
    let errors = errors_of(&answer);
    assert_eq!(errors.errors[0].reason, MismatchReason::UnrecognizedRequest);
}

#[test]
fn test_invalid_json_body_flows_through_the_same_channel() {
    let service = service(vec![greeting_interaction()]);
    let answer = service.handle(
        "POST",
        "/greetings",
        None,
        Vec::new(),
        Some("{not json".to_string()),
    );

    assert_eq!(answer.status, 500);
    let errors = errors_of(&answer);
    assert_eq!(errors.errors[0].reason, MismatchReason::InvalidBody);
    assert_eq!(errors.errors[0].path, "$.body");
}

#[test]
fn test_extra_body_members_are_ignored_by_default() {
    let service = service(vec![greeting_interaction()]);
    let answer = post_json(
        &service,
        "/greetings",
        json!({"greeting": "Hi", "extra": true}),
    );
    assert_eq!(answer.status, 201);
}

#[test]
fn test_strict_mode_rejects_extra_body_members() {
    let config = MockConfig {
        strict: true,
        ..MockConfig::default()
    };
    let service = MockService::new(&config, vec![greeting_interaction()]).unwrap();
    let answer = post_json(
        &service,
        "/greetings",
        json!({"greeting": "Hi", "extra": true}),
    );

    assert_eq!(answer.status, 500);
    let errors = errors_of(&answer);
    assert_eq!(errors.errors[0].path, "$.body.extra");
    assert_eq!(errors.errors[0].reason, MismatchReason::UnexpectedMember);
}

#[test]
fn test_array_minimum_violation_cites_array_path() {
    let interaction = InteractionBuilder::upon_receiving("a bulk upload")
        .with_request(
            RequestTemplate::post("/bulk").body(object([array()
                .named("a")
                .containing_at_least(2)
                .of(like("x"))])),
        )
        .will_respond_with(ResponseTemplate::ok())
        .build()
        .unwrap();
    let service = service(vec![interaction]);

    let answer = post_json(&service, "/bulk", json!({"a": ["only one"]}));
    assert_eq!(answer.status, 500);
    let errors = errors_of(&answer);
    assert_eq!(errors.errors[0].path, "$.body.a");
    assert_eq!(errors.errors[0].reason, MismatchReason::MinimumNotMet);
}

#[test]
fn test_candidates_distinguished_by_method_and_path() {
    let service = service(vec![greeting_interaction(), listing_interaction()]);

    let listing = service.handle("GET", "/greetings", None, Vec::new(), None);
    assert_eq!(listing.status, 200);
    let body: Value = serde_json::from_str(listing.body.as_deref().unwrap()).unwrap();
    assert_eq!(body["greetings"], json!(["Hello world", "Hello world"]));

    let creation = post_json(&service, "/greetings", json!({"greeting": "Yo"}));
    assert_eq!(creation.status, 201);
}

#[test]
fn test_invocation_log_records_outcomes() {
    let service = service(vec![greeting_interaction()]);
    post_json(&service, "/greetings", json!({"greeting": "Hi"}));
    service.handle("GET", "/unknown", None, Vec::new(), None);

    let invocations = service.invocations();
    assert_eq!(invocations.len(), 2);
    assert_eq!(service.request_count(), 2);
    assert!(invocations[0].outcome.is_matched());
    assert_eq!(
        invocations[0].description.as_deref(),
        Some("a request to create a greeting")
    );
    assert!(!invocations[1].outcome.is_matched());
}

#[test]
fn test_verification_reports_never_invoked_interactions() {
    let service = service(vec![greeting_interaction(), listing_interaction()]);
    post_json(&service, "/greetings", json!({"greeting": "Hi"}));

    let report = service.verify_all_matched();
    assert!(!report.success());
    assert_eq!(report.never_invoked, vec!["a request to list greetings"]);
    assert!(report.failed_requests.is_empty());
}

#[test]
fn test_verification_reports_failed_requests() {
    let service = service(vec![greeting_interaction()]);
    post_json(&service, "/greetings", json!({"greeting": true}));

    let report = service.verify_all_matched();
    assert!(!report.success());
    assert_eq!(report.failed_requests.len(), 1);
}

#[test]
fn test_verification_succeeds_when_everything_fired_and_matched() {
    let service = service(vec![greeting_interaction(), listing_interaction()]);
    post_json(&service, "/greetings", json!({"greeting": "Hi"}));
    service.handle("GET", "/greetings", None, Vec::new(), None);

    let report = service.verify_all_matched();
    assert!(report.success(), "{}", report.describe());
}

#[test]
fn test_misconfigured_interaction_fails_at_startup() {
    let broken: covenant_core::template::Template = array().named("broken").into();
    let interaction = InteractionBuilder::upon_receiving("a broken declaration")
        .with_request(RequestTemplate::post("/x"))
        .will_respond_with(ResponseTemplate::ok())
        .build()
        .unwrap();
    // Bad regex smuggled into the document form: compilation must reject it
    // before any request is served.
    let mut interaction = interaction;
    interaction.request.matching_rules.insert(
        "$.body".to_string(),
        covenant_core::rules::MatchingRule::regex("[unclosed"),
    );
    let result = MockService::new(&MockConfig::default(), vec![interaction]);
    assert!(matches!(result, Err(MockError::Interaction { .. })));

    // The elementless array never gets as far as a document; its compile
    // error surfaces from the builder.
    let err = covenant_core::compile(&broken).unwrap_err();
    assert!(matches!(
        err,
        covenant_core::template::TemplateError::ArrayWithoutElement
    ));
}

#[test]
fn test_literal_only_interaction_requires_exact_body() {
    let interaction = InteractionBuilder::upon_receiving("an exact echo")
        .with_request(RequestTemplate::post("/echo").body(literal(json!({"v": 1}))))
        .will_respond_with(ResponseTemplate::ok())
        .build()
        .unwrap();
    assert!(interaction.request.matching_rules.is_empty());
    let service = service(vec![interaction]);

    assert_eq!(post_json(&service, "/echo", json!({"v": 1})).status, 200);
    assert_eq!(post_json(&service, "/echo", json!({"v": 2})).status, 500);
}
