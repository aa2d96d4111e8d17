//! `trucite verify` — score a statement against a scoring backend.
//!
//! By default the statement goes over HTTP to the configured endpoint,
//! walking the candidate paths until one answers. `--local` runs the full
//! pipeline in-process instead, which needs no running service.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;

use crate::cli::{output, report};
use crate::client::{self, ScoreClient, VerifyReport};
use crate::protocol::VerifyRequest;
use crate::server::{run_verify, SharedState};
use crate::session::{self, LastExchange};

#[allow(clippy::too_many_arguments)]
pub async fn run(
    text: Option<&str>,
    file: Option<&str>,
    evidence: Option<&str>,
    evidence_file: Option<&str>,
    policy_mode: Option<&str>,
    endpoint: Option<&str>,
    timeout_ms: u64,
    local: bool,
) -> Result<()> {
    let text = resolve_text(text, file)?;
    let evidence = resolve_evidence(evidence, evidence_file)?;

    let mut request = VerifyRequest::new(&text);
    request.evidence = evidence;
    request.policy_mode = policy_mode.map(str::to_string);
    request.validate()?;

    let payload = serde_json::to_value(&request).unwrap_or_else(|_| serde_json::json!({}));

    if local {
        return run_local(&request, payload).await;
    }

    let base = endpoint
        .map(str::to_string)
        .unwrap_or_else(client::default_endpoint);
    let scorer = ScoreClient::new(&base, timeout_ms)?;

    let spinner = maybe_spinner(&base);
    let outcome = scorer.verify(&request).await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    match outcome {
        Ok(outcome) => {
            store_exchange(LastExchange::new(
                payload,
                outcome.raw.clone(),
                outcome.endpoint.clone(),
            ));
            if output::is_json() {
                output::print_json(&outcome.raw);
            } else {
                report::print_human(&outcome.report, Some(&outcome.endpoint));
            }
            Ok(())
        }
        Err(err) => {
            // A failed verification is a REVIEW outcome, not a process error.
            let degraded = VerifyReport::from_failure(&err);
            if output::is_json() {
                output::print_json(&report::failure_json(&degraded));
            } else {
                report::print_human(&degraded, None);
            }
            Ok(())
        }
    }
}

/// Run the pipeline in-process: same scoring, events, and audit trail as
/// the HTTP service, recorded under the "local" endpoint.
async fn run_local(request: &VerifyRequest, payload: Value) -> Result<()> {
    let state = SharedState::for_runtime();
    let response = run_verify(&state, request, "local").await?;
    let raw = serde_json::to_value(&response).context("failed to encode response")?;

    store_exchange(LastExchange::new(payload, raw.clone(), "local".to_string()));

    if output::is_json() {
        output::print_json(&raw);
    } else {
        let folded = client::normalize::normalize(&raw, "local")?;
        report::print_human(&folded, Some("local"));
    }
    Ok(())
}

fn resolve_text(text: Option<&str>, file: Option<&str>) -> Result<String> {
    match (text, file) {
        (Some(_), Some(_)) => bail!("pass TEXT or --file, not both"),
        (Some(t), None) => Ok(t.to_string()),
        (None, Some(path)) => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
        }
        (None, None) => bail!("nothing to verify. Pass TEXT or --file <path>."),
    }
}

fn resolve_evidence(evidence: Option<&str>, evidence_file: Option<&str>) -> Result<Option<String>> {
    match (evidence, evidence_file) {
        (Some(_), Some(_)) => bail!("pass --evidence or --evidence-file, not both"),
        (Some(e), None) => Ok(Some(e.to_string())),
        (None, Some(path)) => Ok(Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read evidence file {path}"))?,
        )),
        (None, None) => Ok(None),
    }
}

fn store_exchange(exchange: LastExchange) {
    if let Err(e) = session::store(&exchange) {
        if !output::is_quiet() {
            eprintln!("  Warning: could not persist the exchange: {e:#}");
        }
    }
}

fn maybe_spinner(base: &str) -> Option<ProgressBar> {
    if output::is_json() || output::is_quiet() {
        return None;
    }
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("  {spinner} {msg}")
            .unwrap()
            .tick_strings(&[
                "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}",
                "\u{2826}", "\u{2827}", "\u{2807}", "\u{280f}", " ",
            ]),
    );
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner.set_message(format!("verifying against {base}"));
    Some(spinner)
}
