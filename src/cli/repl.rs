//! Interactive REPL for TruCite.
//!
//! Launch with `trucite` (no subcommand) to enter interactive mode. Paste a
//! statement to verify it; type `/help` for commands, Tab for completion.

use rustyline::completion::{Completer, Pair};
use rustyline::config::CompletionType;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{
    Cmd, ConditionalEventHandler, Config, Editor, Event, EventContext, EventHandler, Helper,
    KeyEvent, RepeatCount,
};

use crate::cli::output::Styled;
use crate::cli::report;
use crate::client::{ScoreClient, VerifyReport};
use crate::policy::PolicyMode;
use crate::protocol::VerifyRequest;
use crate::server::{run_verify, SharedState};
use crate::session::{self, LastExchange};

/// Available REPL commands.
const COMMANDS: &[(&str, &str)] = &[
    ("/verify", "Verify a statement (or just paste text)"),
    ("/evidence", "Set evidence for later verifications (empty clears)"),
    ("/mode", "Set policy mode: standard, strict, permissive"),
    ("/endpoint", "Set the backend endpoint URL"),
    ("/local", "Toggle in-process verification (no backend needed)"),
    ("/last", "Show the last exchange (payload|response)"),
    ("/status", "Show backend status"),
    ("/clear", "Clear the screen"),
    ("/help", "Show available commands"),
    ("/exit", "Quit the REPL"),
];

/// REPL helper for tab completion.
struct ReplHelper;

impl Default for ReplHelper {
    fn default() -> Self {
        Self
    }
}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let input = &line[..pos];

        if input.starts_with('/') && !input.contains(' ') {
            let matches: Vec<Pair> = COMMANDS
                .iter()
                .filter(|(cmd, _)| cmd.starts_with(input))
                .map(|(cmd, desc)| Pair {
                    display: format!("{cmd:<12} {desc}"),
                    replacement: format!("{cmd} "),
                })
                .collect();
            return Ok((0, matches));
        }

        // Argument completion for commands with a fixed vocabulary
        let parts: Vec<&str> = input.splitn(2, ' ').collect();
        let cmd = parts[0];
        let args = if parts.len() > 1 { parts[1] } else { "" };

        let options: &[&str] = match cmd {
            "/mode" => &["standard", "strict", "permissive"],
            "/last" => &["payload", "response"],
            _ => return Ok((pos, Vec::new())),
        };

        let prefix_start = input.len() - args.len();
        let matches: Vec<Pair> = options
            .iter()
            .filter(|opt| opt.starts_with(args.trim()))
            .map(|opt| Pair {
                display: opt.to_string(),
                replacement: format!("{opt} "),
            })
            .collect();
        Ok((prefix_start, matches))
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<String> {
        if pos < line.len() || line.is_empty() {
            return None;
        }
        if line.starts_with('/') && !line.contains(' ') {
            for (cmd, _) in COMMANDS {
                if cmd.starts_with(line) && *cmd != line {
                    return Some(cmd[line.len()..].to_string());
                }
            }
        }
        None
    }
}

impl Highlighter for ReplHelper {}
impl Validator for ReplHelper {}
impl Helper for ReplHelper {}

struct TabCompleteOrAcceptHint;

impl ConditionalEventHandler for TabCompleteOrAcceptHint {
    fn handle(
        &self,
        _evt: &Event,
        _n: RepeatCount,
        _positive: bool,
        ctx: &EventContext<'_>,
    ) -> Option<Cmd> {
        if ctx.has_hint() {
            Some(Cmd::CompleteHint)
        } else {
            Some(Cmd::Complete)
        }
    }
}

/// Session state.
struct ReplState {
    evidence: Option<String>,
    mode: Option<String>,
    endpoint: String,
    local: bool,
}

/// Run the interactive REPL.
pub async fn run() -> anyhow::Result<()> {
    eprintln!();
    eprintln!(
        "  \x1b[32m\u{25c9}\x1b[0m \x1b[1mtrucite v{}\x1b[0m \x1b[90m\u{2014} Truth gate for AI-generated text\x1b[0m",
        env!("CARGO_PKG_VERSION")
    );
    eprintln!();
    eprintln!(
        "    Paste a statement to verify it. Press \x1b[36m/\x1b[0m to browse commands, \x1b[90mTab\x1b[0m to complete, \x1b[90m/exit\x1b[0m to quit."
    );
    eprintln!();

    let config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .completion_type(CompletionType::List)
        .completion_prompt_limit(20)
        .build();

    let mut rl: Editor<ReplHelper, rustyline::history::DefaultHistory> =
        Editor::with_config(config)?;
    rl.set_helper(Some(ReplHelper));
    rl.bind_sequence(
        KeyEvent::from('\t'),
        EventHandler::Conditional(Box::new(TabCompleteOrAcceptHint)),
    );

    let hist_path = dirs::home_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("/tmp"))
        .join(".trucite/history");
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    let mut state = ReplState {
        evidence: None,
        mode: None,
        endpoint: crate::client::default_endpoint(),
        local: false,
    };
    let prompt = " \x1b[36mtrucite>\x1b[0m ";

    loop {
        match rl.readline(prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                // Bare text verifies directly
                if !line.starts_with('/') {
                    do_verify(line, &state).await;
                    continue;
                }

                let input = &line[1..];
                if input.is_empty() {
                    cmd_help();
                    continue;
                }

                let mut parts = input.splitn(2, ' ');
                let cmd = parts.next().unwrap_or("");
                let args = parts.next().unwrap_or("").trim();

                match cmd {
                    "exit" | "quit" => {
                        eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                        break;
                    }
                    "help" | "h" | "?" => cmd_help(),
                    "clear" | "cls" => eprint!("\x1b[2J\x1b[H"),
                    "verify" => {
                        if args.is_empty() {
                            eprintln!("  Usage: /verify <text>");
                        } else {
                            do_verify(args, &state).await;
                        }
                    }
                    "evidence" => cmd_evidence(args, &mut state),
                    "mode" => cmd_mode(args, &mut state),
                    "endpoint" => cmd_endpoint(args, &mut state),
                    "local" => {
                        state.local = !state.local;
                        if state.local {
                            eprintln!("  Verifying in-process (no backend).");
                        } else {
                            eprintln!("  Verifying against {}.", state.endpoint);
                        }
                    }
                    "last" => cmd_last(args).await,
                    "status" => {
                        if let Err(e) = crate::cli::status::run(Some(&state.endpoint)).await {
                            eprintln!("  {e:#}");
                        }
                    }
                    _ => {
                        eprintln!("  Unknown command '/{cmd}'. Type /help for commands.");
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("  \x1b[90m(Ctrl+C)\x1b[0m Type \x1b[1m/exit\x1b[0m to quit.");
            }
            Err(ReadlineError::Eof) => {
                eprintln!("  \x1b[90m\u{2728}\x1b[0m Goodbye!");
                break;
            }
            Err(err) => {
                eprintln!("  Error: {err}");
                break;
            }
        }
    }

    let _ = std::fs::create_dir_all(hist_path.parent().unwrap_or(std::path::Path::new(".")));
    let _ = rl.save_history(&hist_path);

    Ok(())
}

async fn do_verify(text: &str, state: &ReplState) {
    let s = Styled::new();

    let mut request = VerifyRequest::new(text);
    request.evidence = state.evidence.clone();
    request.policy_mode = state.mode.clone();
    if let Err(e) = request.validate() {
        eprintln!("  {} {e:#}", s.warn_sym());
        return;
    }
    let payload = serde_json::to_value(&request).unwrap_or_else(|_| serde_json::json!({}));

    if state.local {
        let runtime = SharedState::for_runtime();
        match run_verify(&runtime, &request, "local").await {
            Ok(response) => {
                let raw = serde_json::to_value(&response).unwrap_or_else(|_| serde_json::json!({}));
                let _ = session::store(&LastExchange::new(payload, raw.clone(), "local".into()));
                match crate::client::normalize::normalize(&raw, "local") {
                    Ok(folded) => report::print_human(&folded, Some("local")),
                    Err(e) => eprintln!("  {} {e}", s.warn_sym()),
                }
            }
            Err(e) => eprintln!("  {} {e:#}", s.warn_sym()),
        }
        return;
    }

    let scorer = match ScoreClient::new(&state.endpoint, crate::client::DEFAULT_TIMEOUT_MS) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("  {} {e:#}", s.warn_sym());
            return;
        }
    };

    match scorer.verify(&request).await {
        Ok(outcome) => {
            let _ = session::store(&LastExchange::new(
                payload,
                outcome.raw.clone(),
                outcome.endpoint.clone(),
            ));
            report::print_human(&outcome.report, Some(&outcome.endpoint));
        }
        Err(err) => {
            let degraded = VerifyReport::from_failure(&err);
            report::print_human(&degraded, None);
        }
    }
}

fn cmd_help() {
    eprintln!();
    eprintln!("  Commands:");
    eprintln!();
    for (cmd, desc) in COMMANDS {
        eprintln!("    {cmd:<12} {desc}");
    }
    eprintln!();
    eprintln!("  Tip: any line that does not start with '/' is verified as-is.");
    eprintln!();
}

fn cmd_evidence(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        state.evidence = None;
        eprintln!("  Evidence cleared.");
    } else {
        eprintln!("  Evidence set ({} chars).", args.chars().count());
        state.evidence = Some(args.to_string());
    }
}

fn cmd_mode(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!(
            "  Policy mode: {}",
            state.mode.as_deref().unwrap_or("standard (default)")
        );
        return;
    }
    if PolicyMode::ALL.iter().any(|mode| mode.as_str() == args) {
        state.mode = Some(args.to_string());
        eprintln!("  Policy mode set to {args}.");
    } else {
        eprintln!("  Unknown mode '{args}'. Use standard, strict, or permissive.");
    }
}

fn cmd_endpoint(args: &str, state: &mut ReplState) {
    if args.is_empty() {
        eprintln!("  Endpoint: {}", state.endpoint);
        return;
    }
    match url::Url::parse(args) {
        Ok(_) => {
            state.endpoint = args.to_string();
            eprintln!("  Endpoint set to {args}.");
        }
        Err(e) => eprintln!("  Invalid URL: {e}"),
    }
}

async fn cmd_last(args: &str) {
    let (payload, response) = match args {
        "payload" => (true, false),
        "response" => (false, true),
        _ => (false, false),
    };
    if let Err(e) = crate::cli::last_cmd::run(payload, response).await {
        eprintln!("  {e:#}");
    }
}
