//! `trucite last` — reproduce the most recent request/response exchange.
//!
//! `--payload` and `--response` print one side as clean JSON on stdout, for
//! piping into clipboard tools or bug reports.

use crate::cli::output;
use crate::session;
use anyhow::{bail, Result};

/// Print the recorded exchange, or just one side of it.
pub async fn run(payload: bool, response: bool) -> Result<()> {
    if payload && response {
        bail!("pass --payload or --response, not both");
    }

    let Some(exchange) = session::load() else {
        if output::is_json() {
            output::print_json(&serde_json::json!({
                "error": "no_exchange",
                "message": "No exchange recorded yet",
                "hint": "Run: trucite verify \"<text>\" first"
            }));
            return Ok(());
        }
        bail!("no exchange recorded yet. Run 'trucite verify' first.");
    };

    if payload {
        output::print_json(&exchange.payload);
        return Ok(());
    }
    if response {
        output::print_json(&exchange.response);
        return Ok(());
    }

    if output::is_json() {
        output::print_json(&serde_json::to_value(&exchange).unwrap_or_default());
        return Ok(());
    }

    println!();
    println!("  Last exchange ({})", exchange.saved_at);
    println!("  Endpoint: {}", exchange.endpoint);
    println!();
    println!("  Payload:");
    print_indented(&exchange.payload);
    println!();
    println!("  Response:");
    print_indented(&exchange.response);
    println!();
    println!("  Tip: use --payload or --response for clean JSON to pipe elsewhere.");
    Ok(())
}

fn print_indented(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string());
    for line in pretty.lines() {
        println!("    {line}");
    }
}
