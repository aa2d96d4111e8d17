//! Wire types for the TruCite verification protocol.
//!
//! Requests and responses are JSON over HTTP. The response struct here is the
//! canonical emission (superset of every field the backend has produced);
//! tolerant parsing of older response shapes lives in `client::normalize`.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Candidate endpoint paths, in the order clients try them. The server
/// mounts its verify handler on every one of them.
pub const CANDIDATE_PATHS: &[&str] = &[
    "/verify",
    "/score",
    "/api/score",
    "/truth-score",
    "/api/evaluate",
];

/// Gate actions a verification decision can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gate {
    Allow,
    Review,
    Block,
}

impl Gate {
    /// Parse a gate label case-insensitively. Unrecognized labels resolve to
    /// `Review`: nothing unknown may ever widen to ALLOW.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ALLOW" | "PASS" | "ACCEPT" => Self::Allow,
            "BLOCK" | "DENY" | "REJECT" => Self::Block,
            _ => Self::Review,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Allow => "ALLOW",
            Self::Review => "REVIEW",
            Self::Block => "BLOCK",
        }
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verdict label for an aggregate score.
pub fn verdict_label(score: u32) -> &'static str {
    match score {
        0..=29 => "Low Confidence",
        30..=59 => "Questionable",
        60..=84 => "Needs Verification",
        _ => "Highly Reliable",
    }
}

/// A verification request as posted by clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evidence: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_mode: Option<String>,
}

impl VerifyRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            evidence: None,
            policy_mode: None,
        }
    }

    /// Reject requests whose text is empty after trimming.
    pub fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            bail!("text must be non-empty");
        }
        Ok(())
    }
}

/// Decision attached to a response: the gate action plus a reason string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub action: Gate,
    pub reason: String,
}

/// Diagnostic signals computed alongside the aggregate score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signals {
    pub claim_count: u32,
    pub factual_claims: u32,
    pub grounded_claims: u32,
    pub volatility: f64,
    pub evidence_trust_tier: String,
}

/// One reference matched against a claim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceHit {
    pub title: String,
    pub url: String,
    #[serde(rename = "match")]
    pub matched: String,
}

/// Per-claim entry in the response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaimReport {
    pub id: String,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub confidence_weight: u32,
    pub score: u32,
    pub references: Vec<ReferenceHit>,
}

/// Build identity stamped into every response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionCommit {
    pub version: String,
    pub commit: Option<String>,
}

impl ExecutionCommit {
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            commit: option_env!("TRUCITE_BUILD_COMMIT").map(str::to_string),
        }
    }
}

/// Canonical verification response.
///
/// `readiness_signal` mirrors `score`; the field was renamed across backend
/// iterations and both names stay emitted so older clients keep working.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub score: u32,
    pub readiness_signal: u32,
    pub verdict: String,
    pub decision: Decision,
    pub signals: Signals,
    pub policy_mode: String,
    pub policy_version: String,
    pub policy_hash: String,
    pub event_id: String,
    pub audit_fingerprint: String,
    pub latency_ms: f64,
    pub execution_commit: ExecutionCommit,
    pub claims: Vec<ClaimReport>,
    pub explanation: String,
}

/// Format an error body for HTTP error responses.
pub fn error_body(code: &str, message: &str) -> Value {
    serde_json::json!({
        "error": {
            "code": code,
            "message": message,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_request() {
        let json = r#"{"text": "The moon is real.", "policy_mode": "strict"}"#;
        let req: VerifyRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.text, "The moon is real.");
        assert_eq!(req.policy_mode.as_deref(), Some("strict"));
        assert!(req.evidence.is_none());
    }

    #[test]
    fn test_request_skips_absent_fields() {
        let req = VerifyRequest::new("hello world");
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("evidence").is_none());
        assert!(v.get("policy_mode").is_none());
    }

    #[test]
    fn test_validate_rejects_blank_text() {
        let req = VerifyRequest::new("   \n\t ");
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_gate_parse_lenient() {
        assert_eq!(Gate::parse_lenient("allow"), Gate::Allow);
        assert_eq!(Gate::parse_lenient("  BLOCK "), Gate::Block);
        assert_eq!(Gate::parse_lenient("deny"), Gate::Block);
        assert_eq!(Gate::parse_lenient("review"), Gate::Review);
        assert_eq!(Gate::parse_lenient("quarantine"), Gate::Review);
        assert_eq!(Gate::parse_lenient(""), Gate::Review);
    }

    #[test]
    fn test_gate_serializes_uppercase() {
        let v = serde_json::to_value(Gate::Allow).unwrap();
        assert_eq!(v, "ALLOW");
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(verdict_label(0), "Low Confidence");
        assert_eq!(verdict_label(29), "Low Confidence");
        assert_eq!(verdict_label(30), "Questionable");
        assert_eq!(verdict_label(59), "Questionable");
        assert_eq!(verdict_label(60), "Needs Verification");
        assert_eq!(verdict_label(84), "Needs Verification");
        assert_eq!(verdict_label(85), "Highly Reliable");
        assert_eq!(verdict_label(100), "Highly Reliable");
    }

    #[test]
    fn test_error_body_shape() {
        let body = error_body("E_EMPTY_TEXT", "text must be non-empty");
        assert_eq!(body["error"]["code"], "E_EMPTY_TEXT");
        assert_eq!(body["error"]["message"], "text must be non-empty");
    }
}
