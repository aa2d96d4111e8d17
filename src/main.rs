// Copyright 2026 TruCite Contributors
// SPDX-License-Identifier: Apache-2.0

#![allow(dead_code, unused_imports)]

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod audit;
mod claims;
mod cli;
mod client;
mod events;
mod evidence;
mod policy;
mod protocol;
mod rest;
mod scoring;
mod server;
mod session;

#[derive(Parser)]
#[command(
    name = "trucite",
    about = "TruCite — Truth gate for AI-generated text",
    version,
    after_help = "Run 'trucite <command> --help' for details on each command.\nRun 'trucite' with no command to enter interactive mode."
)]
struct Cli {
    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Enable verbose/debug logging
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a statement and print the scored report
    Verify {
        /// The statement to verify (or use --file)
        text: Option<String>,
        /// Read the statement from a file
        #[arg(long)]
        file: Option<String>,
        /// Supporting evidence text
        #[arg(long)]
        evidence: Option<String>,
        /// Read supporting evidence from a file
        #[arg(long)]
        evidence_file: Option<String>,
        /// Policy mode (standard, strict, permissive)
        #[arg(long)]
        policy_mode: Option<String>,
        /// Backend endpoint URL (defaults to TRUCITE_ENDPOINT or the local runtime)
        #[arg(long)]
        endpoint: Option<String>,
        /// Request timeout in milliseconds
        #[arg(long, default_value = "12000")]
        timeout_ms: u64,
        /// Run the pipeline in-process instead of over HTTP
        #[arg(long)]
        local: bool,
    },
    /// Start the TruCite runtime service
    Start {
        /// HTTP port to serve on
        #[arg(long)]
        port: Option<u16>,
    },
    /// Stop the TruCite runtime service
    Stop,
    /// Check environment and diagnose issues
    Doctor,
    /// Show runtime status
    Status {
        /// Backend endpoint URL to query
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Reproduce the last request/response exchange
    Last {
        /// Print only the request payload JSON
        #[arg(long)]
        payload: bool,
        /// Print only the response JSON
        #[arg(long)]
        response: bool,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global flags via environment variables so all modules can check them
    if cli.json {
        std::env::set_var("TRUCITE_JSON", "1");
    }
    if cli.quiet {
        std::env::set_var("TRUCITE_QUIET", "1");
    }
    if cli.verbose {
        std::env::set_var("TRUCITE_VERBOSE", "1");
    }
    if cli.no_color {
        std::env::set_var("TRUCITE_NO_COLOR", "1");
    }

    let result = match cli.command {
        // No subcommand → launch interactive REPL
        None => cli::repl::run().await,

        Some(Commands::Verify {
            text,
            file,
            evidence,
            evidence_file,
            policy_mode,
            endpoint,
            timeout_ms,
            local,
        }) => {
            cli::verify_cmd::run(
                text.as_deref(),
                file.as_deref(),
                evidence.as_deref(),
                evidence_file.as_deref(),
                policy_mode.as_deref(),
                endpoint.as_deref(),
                timeout_ms,
                local,
            )
            .await
        }
        Some(Commands::Start { port }) => cli::start::run(port).await,
        Some(Commands::Stop) => cli::stop::run().await,
        Some(Commands::Doctor) => cli::doctor::run().await,
        Some(Commands::Status { endpoint }) => cli::status::run(endpoint.as_deref()).await,
        Some(Commands::Last { payload, response }) => cli::last_cmd::run(payload, response).await,
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "trucite", &mut std::io::stdout());
            Ok(())
        }
    };

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        if !cli::output::is_quiet() && !cli::output::is_json() {
            eprintln!("  Error: {e:#}");
        }
        if cli::output::is_json() {
            cli::output::print_json(&serde_json::json!({
                "error": true,
                "message": format!("{e:#}"),
            }));
        }
        std::process::exit(1);
    }

    result
}
