//! Tolerant folding of heterogeneous backend responses.
//!
//! The backend has gone through several response shapes (`final_score` vs
//! `score` vs `readiness_signal`, decision as object vs bare string, fields
//! appearing and disappearing between iterations). Everything here is
//! key-name fallback chains and permissive coercion; the only hard
//! requirement is a numeric score under one of the known names.

use serde_json::Value;

use crate::client::ClientError;
use crate::policy::{self, PolicyMode};
use crate::protocol::{verdict_label, ExecutionCommit, Gate};

/// Key names a numeric score may hide under, in priority order.
const SCORE_KEYS: &[&str] = &["score", "readiness_signal", "final_score"];

/// Normalized view of one verification response.
#[derive(Debug, Clone)]
pub struct VerifyReport {
    /// `None` only in degraded reports built from a failure.
    pub score: Option<u32>,
    pub verdict: String,
    pub gate: Gate,
    pub reason: String,
    pub signals: Vec<(String, Value)>,
    pub policy_mode: Option<String>,
    pub policy_version: Option<String>,
    pub policy_hash: Option<String>,
    pub event_id: Option<String>,
    pub audit_fingerprint: Option<String>,
    pub latency_ms: Option<f64>,
    pub execution_commit: Option<ExecutionCommit>,
    pub claims: Vec<ClaimSummary>,
    pub explanation: Option<String>,
    /// The failure this report was synthesized from, if any.
    pub failure: Option<String>,
}

/// Per-claim line in the normalized report.
#[derive(Debug, Clone)]
pub struct ClaimSummary {
    pub id: String,
    pub text: String,
    pub kind: Option<String>,
    pub score: Option<u32>,
    pub weight: Option<f64>,
    pub reference_count: usize,
}

impl VerifyReport {
    /// Degraded report for a failed verification. Always the REVIEW state:
    /// a failure routes to human review, never to ALLOW and never to a crash.
    pub fn from_failure(error: &ClientError) -> Self {
        Self {
            score: None,
            verdict: "Verification Unavailable".to_string(),
            gate: Gate::Review,
            reason: "verification did not complete; route to human review".to_string(),
            signals: Vec::new(),
            policy_mode: None,
            policy_version: None,
            policy_hash: None,
            event_id: None,
            audit_fingerprint: None,
            latency_ms: None,
            execution_commit: None,
            claims: Vec::new(),
            explanation: None,
            failure: Some(error.to_string()),
        }
    }
}

/// Fold a raw backend response into a typed report.
///
/// `source` names the URL the response came from and only feeds error
/// messages.
pub fn normalize(raw: &Value, source: &str) -> Result<VerifyReport, ClientError> {
    let score = read_score(raw).ok_or_else(|| ClientError::Contract {
        url: source.to_string(),
        detail: "no numeric score under any known key".to_string(),
    })?;

    let mode = PolicyMode::parse_or_default(raw.get("policy_mode").and_then(Value::as_str));

    let verdict = raw
        .get("verdict")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| verdict_label(score).to_string());

    let (gate, reason) = read_decision(raw, score, mode);

    let signals = raw
        .get("signals")
        .and_then(Value::as_object)
        .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
        .unwrap_or_default();

    let claims = raw
        .get("claims")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .enumerate()
                .map(|(i, c)| read_claim(i, c))
                .collect()
        })
        .unwrap_or_default();

    Ok(VerifyReport {
        score: Some(score),
        verdict,
        gate,
        reason,
        signals,
        policy_mode: read_string(raw, "policy_mode"),
        policy_version: read_string(raw, "policy_version"),
        policy_hash: read_string(raw, "policy_hash"),
        event_id: read_string(raw, "event_id"),
        audit_fingerprint: read_string(raw, "audit_fingerprint"),
        latency_ms: raw.get("latency_ms").and_then(coerce_number),
        execution_commit: read_commit(raw),
        claims,
        explanation: read_string(raw, "explanation"),
        failure: None,
    })
}

fn read_string(v: &Value, key: &str) -> Option<String> {
    v.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Integer score in 0..=100 from any known key. Floats round; out-of-range
/// values clamp rather than fail.
fn read_score(v: &Value) -> Option<u32> {
    for key in SCORE_KEYS {
        if let Some(n) = v.get(*key).and_then(coerce_number) {
            return Some(n.round().clamp(0.0, 100.0) as u32);
        }
    }
    None
}

/// Numbers may arrive as JSON numbers or numeric strings.
fn coerce_number(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Decision: object with action/reason, bare action string (older shape),
/// or absent. Absent derives the gate locally from the score, using the
/// same bands the server applies.
fn read_decision(raw: &Value, score: u32, mode: PolicyMode) -> (Gate, String) {
    match raw.get("decision") {
        Some(Value::Object(obj)) => {
            let gate = obj
                .get("action")
                .and_then(Value::as_str)
                .map(Gate::parse_lenient)
                .unwrap_or(Gate::Review);
            let reason = obj
                .get("reason")
                .and_then(Value::as_str)
                .unwrap_or("backend supplied no reason")
                .to_string();
            (gate, reason)
        }
        Some(Value::String(action)) => (
            Gate::parse_lenient(action),
            "backend supplied no reason".to_string(),
        ),
        _ => {
            let derived = policy::evaluate(mode, score);
            (derived.action, derived.reason)
        }
    }
}

fn read_commit(v: &Value) -> Option<ExecutionCommit> {
    let obj = v.get("execution_commit")?.as_object()?;
    Some(ExecutionCommit {
        version: obj
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or("unknown")
            .to_string(),
        commit: obj.get("commit").and_then(Value::as_str).map(str::to_string),
    })
}

fn read_claim(index: usize, c: &Value) -> ClaimSummary {
    ClaimSummary {
        id: c
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("c{}", index + 1)),
        text: c
            .get("text")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        kind: read_string(c, "type"),
        score: c
            .get("score")
            .and_then(coerce_number)
            .map(|n| n.round().clamp(0.0, 100.0) as u32),
        weight: c.get("confidence_weight").and_then(coerce_number),
        reference_count: c
            .get("references")
            .and_then(Value::as_array)
            .map(|a| a.len())
            .unwrap_or(0),
    }
}
