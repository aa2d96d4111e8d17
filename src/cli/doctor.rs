//! Environment readiness check.

use crate::client;
use crate::policy::{self, PolicyMode};
use crate::session;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;

/// Check data directory, policy table, audit log, and backend reachability.
pub async fn run() -> Result<()> {
    println!("TruCite Doctor");
    println!("==============");
    println!();

    // OS and architecture
    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Check data directory
    let data_dir = trucite_dir();
    let dir_ok = std::fs::create_dir_all(&data_dir).is_ok();
    if dir_ok {
        println!("[OK] Data directory {} is writable", data_dir.display());
    } else {
        println!("[!!] Cannot create data directory {}", data_dir.display());
    }

    // Check policy table
    let policy_ok = PolicyMode::ALL.iter().all(|mode| {
        let t = mode.thresholds();
        t.block_below < t.allow_at && t.allow_at <= 100
    });
    if policy_ok {
        println!(
            "[OK] Policy table consistent (version {}, hash {})",
            policy::POLICY_VERSION,
            &policy::policy_hash()[..12]
        );
    } else {
        println!("[!!] Policy table has inverted thresholds");
    }

    // Check audit log
    let audit_path = data_dir.join("audit.jsonl");
    match std::fs::metadata(&audit_path) {
        Ok(meta) => println!("[OK] Audit log present ({} bytes)", meta.len()),
        Err(_) => println!("[??] No audit log yet (first verification will create it)"),
    }

    // Check last exchange
    if session::load().is_some() {
        println!("[OK] Last exchange available for `trucite last`");
    } else {
        println!("[??] No recorded exchange yet");
    }

    // Check backend reachability
    let base = client::default_endpoint();
    let backend_up = probe_health(&base).await;
    if backend_up {
        println!("[OK] Backend answering at {base}");
    } else {
        println!("[!!] Backend NOT answering at {base}. Run `trucite start` or verify with --local.");
    }

    println!();
    let ready = dir_ok && policy_ok;
    if ready {
        println!("Status: READY");
        if !backend_up {
            println!("  Run `trucite start` to serve the HTTP API.");
        }
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}

fn trucite_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".trucite")
}

async fn probe_health(base: &str) -> bool {
    let Ok(base_url) = url::Url::parse(base) else {
        return false;
    };
    let Ok(url) = base_url.join("/health") else {
        return false;
    };
    let http = reqwest::Client::builder()
        .timeout(Duration::from_millis(2_000))
        .build()
        .unwrap_or_default();
    matches!(http.get(url).send().await, Ok(resp) if resp.status().is_success())
}
