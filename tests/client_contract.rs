//! Client Contract Test
//!
//! Exercises `ScoreClient` against a mock backend:
//! - Candidate path walk: 404s and HTML landing pages advance, errors stop
//! - Normalization of canonical and legacy response shapes
//! - Failure taxonomy: unreachable, exhausted, non-JSON, contract breaches

use serde_json::json;
use trucite_runtime::client::{ClientError, ScoreClient};
use trucite_runtime::protocol::{Gate, VerifyRequest};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Test Fixture Builders ──

fn request() -> VerifyRequest {
    VerifyRequest::new("Humans were on the moon in 1969.")
}

fn client_for(server: &MockServer) -> ScoreClient {
    ScoreClient::new(&server.uri(), 2_000).expect("mock server URI is valid")
}

/// Canonical backend response, every field present.
fn canonical_body() -> serde_json::Value {
    json!({
        "score": 92,
        "readiness_signal": 92,
        "verdict": "Highly Reliable",
        "decision": { "action": "ALLOW", "reason": "score 92 meets the standard allow threshold 85" },
        "signals": {
            "claim_count": 1,
            "factual_claims": 1,
            "grounded_claims": 1,
            "volatility": 0.0,
            "evidence_trust_tier": "corroborated"
        },
        "policy_mode": "standard",
        "policy_version": "v2",
        "policy_hash": "a".repeat(64),
        "event_id": "7f9a2b1c-0000-4000-8000-000000000001",
        "audit_fingerprint": "b".repeat(64),
        "latency_ms": 12.5,
        "execution_commit": { "version": "1.0.0", "commit": null },
        "claims": [{
            "id": "c1",
            "text": "Humans were on the moon in 1969.",
            "type": "factual",
            "confidence_weight": 3,
            "score": 92,
            "references": [{ "title": "NASA Apollo 11 Mission Overview", "url": "https://www.nasa.gov/mission/apollo-11/", "match": "Apollo 11 landed on the Moon in July 1969." }]
        }],
        "explanation": "Claim Engine v2"
    })
}

/// Test: canonical response normalizes into a full report
#[tokio::test]
async fn test_canonical_response_normalizes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canonical_body()))
        .mount(&server)
        .await;

    let outcome = client_for(&server).verify(&request()).await.unwrap();

    assert!(outcome.endpoint.ends_with("/verify"));
    let report = &outcome.report;
    assert_eq!(report.score, Some(92));
    assert_eq!(report.verdict, "Highly Reliable");
    assert_eq!(report.gate, Gate::Allow);
    assert_eq!(report.policy_mode.as_deref(), Some("standard"));
    assert_eq!(report.latency_ms, Some(12.5));
    assert_eq!(report.claims.len(), 1);
    assert_eq!(report.claims[0].id, "c1");
    assert_eq!(report.claims[0].reference_count, 1);
    assert!(report.failure.is_none());
    // The raw body rides along for JSON output and the last-exchange store.
    assert_eq!(outcome.raw["score"], 92);
}

/// Test: legacy body with final_score and no decision derives the gate
#[tokio::test]
async fn test_legacy_final_score_derives_decision() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "final_score": "58",
            "policy_mode": "standard"
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).verify(&request()).await.unwrap();

    let report = &outcome.report;
    assert_eq!(report.score, Some(58), "numeric strings should coerce");
    assert_eq!(report.verdict, "Questionable", "verdict derives from the score band");
    assert_eq!(report.gate, Gate::Review, "58 sits in the standard review band");
    assert!(
        report.reason.contains("review band"),
        "derived reason should name the band, got: {}",
        report.reason
    );
}

/// Test: an unknown gate label never widens to allow
#[tokio::test]
async fn test_unknown_gate_label_reviews() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "score": 95,
            "decision": "quarantine"
        })))
        .mount(&server)
        .await;

    let outcome = client_for(&server).verify(&request()).await.unwrap();
    assert_eq!(
        outcome.report.gate,
        Gate::Review,
        "an unrecognized gate label must fail closed even at score 95"
    );
}

/// Test: the walk probes candidates in order and lands on the mounted path
#[tokio::test]
async fn test_walk_skips_404_candidates() {
    let server = MockServer::start().await;
    // Only the third candidate serves the API; the rest 404.
    Mock::given(method("POST"))
        .and(path("/api/score"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canonical_body()))
        .mount(&server)
        .await;

    let outcome = client_for(&server).verify(&request()).await.unwrap();
    assert!(outcome.endpoint.ends_with("/api/score"));

    let probed: Vec<String> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect();
    assert_eq!(
        probed,
        vec!["/verify", "/score", "/api/score"],
        "walk should try candidates in declared order and stop at the first hit"
    );
}

/// Test: an HTML landing page advances the walk
#[tokio::test]
async fn test_html_landing_page_advances() {
    let server = MockServer::start().await;
    // A catch-all route answers 200 with the landing page on /verify.
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<!DOCTYPE html><html><body>TruCite Backend is Running</body></html>",
            "text/html",
        ))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/score"))
        .respond_with(ResponseTemplate::new(200).set_body_json(canonical_body()))
        .mount(&server)
        .await;

    let outcome = client_for(&server).verify(&request()).await.unwrap();
    assert!(
        outcome.endpoint.ends_with("/score"),
        "HTML on /verify should advance the walk to /score"
    );
}

/// Test: a server error stops the walk immediately
#[tokio::test]
async fn test_server_error_stops_walk() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = client_for(&server).verify(&request()).await.unwrap_err();
    assert!(
        matches!(err, ClientError::BadStatus { status: 500, .. }),
        "expected BadStatus(500), got: {err}"
    );

    let probed = server.received_requests().await.unwrap();
    assert_eq!(probed.len(), 1, "a refusing backend should not be probed further");
}

/// Test: a 2xx non-JSON body is a contract stop, not a skip
#[tokio::test]
async fn test_non_json_success_body_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("readiness: high", "text/plain"))
        .mount(&server)
        .await;

    let err = client_for(&server).verify(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::NotJson { .. }), "got: {err}");
}

/// Test: a JSON body with no usable score breaches the contract
#[tokio::test]
async fn test_missing_score_breaches_contract() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/verify"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"verdict": "fine"})))
        .mount(&server)
        .await;

    let err = client_for(&server).verify(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Contract { .. }), "got: {err}");
}

/// Test: a live origin with no scoring route exhausts the candidates
#[tokio::test]
async fn test_all_404_exhausts_candidates() {
    let server = MockServer::start().await;

    let err = client_for(&server).verify(&request()).await.unwrap_err();
    assert!(matches!(err, ClientError::Exhausted { .. }), "got: {err}");
    assert!(err.to_string().contains("exhausted"));

    let probed = server.received_requests().await.unwrap();
    assert_eq!(probed.len(), 5, "every candidate path should have been probed");
}

/// Test: a dead origin reports unreachable, not exhausted
#[tokio::test]
async fn test_dead_origin_is_unreachable() {
    // Nothing listens on port 1.
    let client = ScoreClient::new("http://127.0.0.1:1", 500).unwrap();
    let err = client.verify(&request()).await.unwrap_err();
    assert!(
        matches!(err, ClientError::Unreachable { .. }),
        "connection refusals on every path should report Unreachable, got: {err}"
    );
    assert!(err.to_string().contains("unreachable"));
}
