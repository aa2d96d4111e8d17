//! Start the TruCite runtime service.

use crate::cli::output::{self, Styled};
use crate::rest;
use crate::server::{SharedState, DEFAULT_PORT};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Get the PID file path.
pub fn pid_file_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".trucite/trucite.pid")
}

/// Check if TruCite is already running. Returns the PID if so.
pub fn check_already_running() -> Option<i32> {
    let pid_path = pid_file_path();
    if !pid_path.exists() {
        return None;
    }
    let pid_str = std::fs::read_to_string(&pid_path).ok()?;
    let pid: i32 = pid_str.trim().parse().ok()?;

    // Check if the process is actually alive
    #[cfg(unix)]
    {
        let output = std::process::Command::new("kill")
            .args(["-0", &pid.to_string()])
            .output();
        if matches!(output, Ok(o) if o.status.success()) {
            return Some(pid);
        }
    }

    // Stale PID file — clean up
    let _ = std::fs::remove_file(&pid_path);
    None
}

/// Start the runtime: write PID, serve the HTTP API until Ctrl+C.
pub async fn run(port: Option<u16>) -> Result<()> {
    let s = Styled::new();
    let port = port
        .or_else(|| std::env::var("TRUCITE_PORT").ok().and_then(|p| p.parse().ok()))
        .unwrap_or(DEFAULT_PORT);

    // Check if already running
    if let Some(pid) = check_already_running() {
        eprintln!("  {} TruCite is already running (PID {pid}).", s.warn_sym());
        eprintln!("  Use 'trucite stop' first.");
        std::process::exit(1);
    }

    // Ensure ~/.trucite/ exists
    let pid_path = pid_file_path();
    if let Some(parent) = pid_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trucite=info".parse().unwrap()),
        )
        .init();

    info!("starting TruCite v{}", env!("CARGO_PKG_VERSION"));

    // Write PID file
    std::fs::write(&pid_path, std::process::id().to_string())
        .context("failed to write PID file")?;

    if !output::is_quiet() {
        eprintln!(
            "  {} TruCite v{} started (PID {})",
            s.ok_sym(),
            env!("CARGO_PKG_VERSION"),
            std::process::id()
        );
        eprintln!("  Listening on http://127.0.0.1:{port}");
    }

    let state = Arc::new(SharedState::for_runtime());

    let result = tokio::select! {
        served = rest::start(port, Arc::clone(&state)) => served,
        _ = tokio::signal::ctrl_c() => {
            info!("received shutdown signal");
            Ok(())
        }
    };

    // Clean up on exit
    let _ = std::fs::remove_file(&pid_path);

    if !output::is_quiet() {
        eprintln!("  {} TruCite stopped.", s.ok_sym());
    }

    result
}
