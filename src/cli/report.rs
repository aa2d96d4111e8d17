//! Terminal rendering of verification reports.
//!
//! One report prints as a score gauge, a colored gate badge, and the
//! supporting detail (signals, policy provenance, per-claim lines). Degraded
//! reports from a failed verification render a warning plus the REVIEW gate
//! instead of the gauge.

use serde_json::Value;

use crate::cli::output::Styled;
use crate::client::VerifyReport;
use crate::protocol::Gate;

/// Width of the score gauge in characters.
const GAUGE_WIDTH: usize = 25;

/// Claim texts longer than this are truncated in the table.
const CLAIM_DISPLAY_CHARS: usize = 60;

/// Print the human-readable report to stdout.
pub fn print_human(report: &VerifyReport, endpoint: Option<&str>) {
    let s = Styled::new();

    println!();
    if let Some(failure) = &report.failure {
        println!("  {} Verification unavailable: {failure}", s.warn_sym());
        println!();
        println!("  Gate:    {}", badge(&s, report.gate));
        println!("  Reason:  {}", report.reason);
        println!("  Verdict: {}", report.verdict);
        println!();
        return;
    }

    let score = report.score.unwrap_or(0);
    println!(
        "  {}  {score:>3} / 100   {}",
        colored_gauge(&s, score),
        s.bold(&report.verdict)
    );
    println!();
    println!(
        "  Gate:    {}  {}",
        badge(&s, report.gate),
        s.dim(&report.reason)
    );

    if !report.signals.is_empty() {
        println!();
        println!("  Signals:");
        for (key, value) in &report.signals {
            println!("    {key:<22} {}", fmt_value(value));
        }
    }

    println!();
    if let Some(mode) = &report.policy_mode {
        let version = report.policy_version.as_deref().unwrap_or("?");
        match &report.policy_hash {
            Some(hash) => println!(
                "  Policy:  {mode} ({version}, hash {})",
                truncate(hash, 12)
            ),
            None => println!("  Policy:  {mode} ({version})"),
        }
    }
    if let Some(event_id) = &report.event_id {
        println!("  Event:   {event_id}");
    }
    if let Some(fingerprint) = &report.audit_fingerprint {
        println!("  Audit:   {fingerprint}");
    }
    if let Some(latency) = report.latency_ms {
        println!("  Latency: {latency} ms");
    }
    if let Some(commit) = &report.execution_commit {
        match &commit.commit {
            Some(sha) => println!("  Engine:  {} (commit {})", commit.version, truncate(sha, 12)),
            None => println!("  Engine:  {}", commit.version),
        }
    }
    if let Some(endpoint) = endpoint {
        println!("  Served:  {endpoint}");
    }

    if !report.claims.is_empty() {
        println!();
        println!("  Claims:");
        for claim in &report.claims {
            let score_cell = match claim.score {
                Some(n) => format!("{n:>3}"),
                None => "  ?".to_string(),
            };
            let kind = claim.kind.as_deref().unwrap_or("?");
            let refs = if claim.reference_count > 0 {
                s.dim(&format!("  ({} refs)", claim.reference_count))
            } else {
                String::new()
            };
            println!(
                "    {:<4} [{score_cell}] {kind:<8} {}{refs}",
                claim.id,
                truncate(&claim.text, CLAIM_DISPLAY_CHARS),
            );
        }
    }

    if let Some(explanation) = &report.explanation {
        println!();
        println!("  {}", s.dim(explanation));
    }
    println!();
}

/// Machine-readable shape for a degraded report, mirroring the response
/// contract so JSON consumers handle both cases with one parser.
pub fn failure_json(report: &VerifyReport) -> Value {
    serde_json::json!({
        "score": Value::Null,
        "verdict": report.verdict,
        "decision": {
            "action": report.gate.as_str(),
            "reason": report.reason,
        },
        "failure": report.failure,
    })
}

/// Fixed-width score gauge, e.g. `[██████████░░░░░░░░░░░░░░░]`.
fn gauge(score: u32) -> String {
    let filled = (score as usize * GAUGE_WIDTH + 50) / 100;
    let filled = filled.min(GAUGE_WIDTH);
    format!(
        "[{}{}]",
        "\u{2588}".repeat(filled),
        "\u{2591}".repeat(GAUGE_WIDTH - filled)
    )
}

fn colored_gauge(s: &Styled, score: u32) -> String {
    let bar = gauge(score);
    match score {
        0..=29 => s.red(&bar),
        30..=59 => s.yellow(&bar),
        60..=84 => bar,
        _ => s.green(&bar),
    }
}

fn badge(s: &Styled, gate: Gate) -> String {
    match gate {
        Gate::Allow => s.green(gate.as_str()),
        Gate::Review => s.yellow(gate.as_str()),
        Gate::Block => s.red(gate.as_str()),
    }
}

/// JSON strings render bare in the table; everything else renders compact.
fn fmt_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let head: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{head}...")
}
