//! Verification pipeline and shared server state.
//!
//! This is the backend half of the runtime: extract claims, score them,
//! ground them against evidence, aggregate, gate through policy, and stamp
//! audit metadata. The REST layer in `rest.rs` wraps the pipeline with HTTP;
//! the CLI's `--local` mode calls it directly.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use chrono::Utc;
use futures::future;
use tokio::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

use crate::audit::audit_fingerprint;
use crate::audit::logger::{AuditLogger, AuditRecord};
use crate::claims::{self, ClaimKind};
use crate::events::{self, EventBus, TruCiteEvent};
use crate::evidence::{self, EvidenceSource, SeedCorpus};
use crate::policy::{self, PolicyMode, POLICY_VERSION};
use crate::protocol::{verdict_label, ClaimReport, ExecutionCommit, Signals, VerifyRequest, VerifyResponse};
use crate::scoring;

/// Default port the HTTP service binds.
pub const DEFAULT_PORT: u16 = 7311;

/// Event bus buffer capacity.
const EVENT_BUS_CAPACITY: usize = 256;

/// Explanation string attached to every canonical response.
pub const EXPLANATION: &str =
    "Claim Engine v2 + MVP Reference Grounding (seed corpus keyword match).";

// Wire error codes.
pub const E_INVALID_PARAMS: &str = "E_INVALID_PARAMS";
pub const E_EMPTY_TEXT: &str = "E_EMPTY_TEXT";
pub const E_INTERNAL: &str = "E_INTERNAL";

/// Shared state passed to request handlers.
pub struct SharedState {
    pub started_at: Instant,
    pub evidence: Arc<dyn EvidenceSource>,
    /// Audit log guarded by a mutex; appends are short. `None` disables
    /// audit persistence (tests, restricted environments).
    pub audit: Option<Mutex<AuditLogger>>,
    pub event_bus: EventBus,
}

impl SharedState {
    pub fn new(evidence: Arc<dyn EvidenceSource>, audit: Option<AuditLogger>) -> Self {
        Self {
            started_at: Instant::now(),
            evidence,
            audit: audit.map(Mutex::new),
            event_bus: EventBus::new(EVENT_BUS_CAPACITY),
        }
    }

    /// State for a running service: seed corpus evidence plus the default
    /// audit log. A missing home directory downgrades to no persistence.
    pub fn for_runtime() -> Self {
        let audit = match AuditLogger::default_logger() {
            Ok(logger) => Some(logger),
            Err(e) => {
                warn!("audit log unavailable: {e:#}");
                None
            }
        };
        Self::new(Arc::new(SeedCorpus), audit)
    }
}

/// Run the verification pipeline for one request.
///
/// `endpoint` names where the request came from (an HTTP path, or "local"
/// for in-process runs) and is recorded in events and the audit log.
pub async fn run_verify(
    state: &SharedState,
    request: &VerifyRequest,
    endpoint: &str,
) -> Result<VerifyResponse> {
    request.validate()?;

    let started = Instant::now();
    let event_id = Uuid::new_v4().to_string();
    let mode = PolicyMode::parse_or_default(request.policy_mode.as_deref());

    state.event_bus.emit(TruCiteEvent::VerifyStarted {
        event_id: event_id.clone(),
        endpoint: endpoint.to_string(),
        policy_mode: mode.as_str().to_string(),
        text_chars: request.text.chars().count(),
        timestamp: events::now_timestamp(),
    });

    let extracted = claims::extract_claims(&request.text);
    let factual = extracted
        .iter()
        .filter(|c| c.kind == ClaimKind::Factual)
        .count();

    state.event_bus.emit(TruCiteEvent::ClaimsExtracted {
        event_id: event_id.clone(),
        claim_count: extracted.len(),
        factual,
    });

    let scored = scoring::score_claims(&extracted);

    // Ground all claims concurrently against the evidence source.
    let ground_futures = scored.iter().map(|s| state.evidence.ground(&s.claim.text));
    let grounded: Vec<_> = match future::join_all(ground_futures)
        .await
        .into_iter()
        .collect::<Result<_>>()
        .context("evidence grounding failed")
    {
        Ok(g) => g,
        Err(e) => {
            state.event_bus.emit(TruCiteEvent::VerifyFailed {
                event_id: event_id.clone(),
                error: format!("{e:#}"),
            });
            return Err(e);
        }
    };

    let corpus_grounded = grounded.iter().filter(|refs| !refs.is_empty()).count();

    // User-supplied evidence is an extra grounding source: any claim sharing
    // enough significant words with it gets a reference hit.
    let user_evidence = request
        .evidence
        .as_deref()
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let mut user_grounded = 0;
    let mut references = grounded;
    if let Some(user_text) = user_evidence {
        for (refs, s) in references.iter_mut().zip(&scored) {
            if evidence::evidence_overlap(&s.claim.text, user_text) {
                refs.push(evidence::user_evidence_hit(user_text));
                user_grounded += 1;
            }
        }
    }
    let grounded_claims = references.iter().filter(|refs| !refs.is_empty()).count();

    let score = scoring::aggregate_score(&scored);
    let verdict = verdict_label(score).to_string();

    state.event_bus.emit(TruCiteEvent::VerifyScored {
        event_id: event_id.clone(),
        score,
        verdict: verdict.clone(),
    });

    let decision = policy::evaluate(mode, score);
    let policy_hash = policy::policy_hash();

    let signals = Signals {
        claim_count: scored.len() as u32,
        factual_claims: factual as u32,
        grounded_claims: grounded_claims as u32,
        volatility: scoring::volatility(&scored),
        evidence_trust_tier: evidence::trust_tier(scored.len(), corpus_grounded, user_grounded)
            .to_string(),
    };

    let latency_ms = round2(started.elapsed().as_secs_f64() * 1000.0);
    let fingerprint =
        audit_fingerprint(&event_id, &policy_hash, score, decision.action, &request.text);

    if let Some(audit) = &state.audit {
        let record = AuditRecord {
            timestamp: Utc::now().to_rfc3339(),
            event_id: event_id.clone(),
            endpoint: endpoint.to_string(),
            policy_mode: mode.as_str().to_string(),
            score,
            gate: decision.action.as_str().to_string(),
            claim_count: scored.len(),
            latency_ms,
            fingerprint: fingerprint.clone(),
        };
        if let Err(e) = audit.lock().await.log(&record) {
            warn!("audit append failed: {e:#}");
        }
    }

    state.event_bus.emit(TruCiteEvent::VerifyComplete {
        event_id: event_id.clone(),
        score,
        gate: decision.action.as_str().to_string(),
        latency_ms,
    });

    let claim_reports: Vec<ClaimReport> = scored
        .iter()
        .zip(references)
        .map(|(s, refs)| ClaimReport {
            id: s.claim.id.clone(),
            text: s.claim.text.clone(),
            kind: s.claim.kind.as_str().to_string(),
            confidence_weight: s.claim.weight,
            score: s.score,
            references: refs,
        })
        .collect();

    Ok(VerifyResponse {
        score,
        readiness_signal: score,
        verdict,
        decision,
        signals,
        policy_mode: mode.as_str().to_string(),
        policy_version: POLICY_VERSION.to_string(),
        policy_hash,
        event_id,
        audit_fingerprint: fingerprint,
        latency_ms,
        execution_commit: ExecutionCommit::current(),
        claims: claim_reports,
        explanation: EXPLANATION.to_string(),
    })
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
