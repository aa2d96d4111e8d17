//! Show status of the running TruCite runtime.

use crate::cli::output::{self, Styled};
use crate::cli::start::check_already_running;
use crate::client;
use anyhow::{Context, Result};
use serde_json::Value;
use std::time::Duration;

/// Query the runtime status endpoint and display it.
pub async fn run(endpoint: Option<&str>) -> Result<()> {
    let s = Styled::new();
    let base = endpoint
        .map(str::to_string)
        .unwrap_or_else(client::default_endpoint);
    let base_url = url::Url::parse(&base).with_context(|| format!("invalid endpoint URL: {base}"))?;
    let url = base_url
        .join("/api/v1/status")
        .context("failed to build status URL")?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(3_000))
        .build()
        .unwrap_or_default();

    let answer = match http.get(url.clone()).send().await {
        Ok(resp) if resp.status().is_success() => resp.json::<Value>().await.ok(),
        _ => None,
    };

    let Some(body) = answer else {
        if output::is_json() {
            output::print_json(&serde_json::json!({ "running": false }));
            return Ok(());
        }
        match check_already_running() {
            Some(pid) => println!(
                "  {} Process alive (PID {pid}) but the API at {url} did not answer.",
                s.warn_sym()
            ),
            None => println!("  {} TruCite is not running.", s.warn_sym()),
        }
        return Ok(());
    };

    if output::is_json() {
        output::print_json(&body);
        return Ok(());
    }

    println!("  {} TruCite is running at {base_url}", s.ok_sym());
    println!("    Version:  {}", body["version"].as_str().unwrap_or("?"));
    println!("    Uptime:   {} s", body["uptime_s"].as_u64().unwrap_or(0));
    println!(
        "    Policy:   {} (modes: {})",
        body["policy_version"].as_str().unwrap_or("?"),
        body["policy_modes"]
            .as_array()
            .map(|modes| {
                modes
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_else(|| "?".to_string())
    );
    if let Some(hash) = body["policy_hash"].as_str() {
        println!("    Hash:     {}", hash.get(..12).unwrap_or(hash));
    }
    println!(
        "    Evidence: {}",
        body["evidence_source"].as_str().unwrap_or("?")
    );
    println!(
        "    Audit:    {}",
        if body["audit_enabled"].as_bool().unwrap_or(false) {
            "enabled"
        } else {
            "disabled"
        }
    );

    Ok(())
}
