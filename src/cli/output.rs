//! Global output mode helpers shared by every subcommand.
//!
//! The binary sets `TRUCITE_JSON` / `TRUCITE_QUIET` / `TRUCITE_NO_COLOR`
//! from the global flags before dispatching, so any module can check the
//! mode without threading flags through call stacks.

/// True when `--json` was passed: stdout carries machine-readable JSON only.
pub fn is_json() -> bool {
    std::env::var("TRUCITE_JSON").is_ok()
}

/// True when `--quiet` was passed: suppress non-essential human output.
pub fn is_quiet() -> bool {
    std::env::var("TRUCITE_QUIET").is_ok()
}

/// True when `--verbose` was passed.
pub fn is_verbose() -> bool {
    std::env::var("TRUCITE_VERBOSE").is_ok()
}

/// Print a machine-readable JSON value to stdout.
pub fn print_json(value: &serde_json::Value) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// ANSI styling that degrades to plain text when colors are off.
///
/// Honors both `--no-color` (via `TRUCITE_NO_COLOR`) and the conventional
/// `NO_COLOR` environment variable.
pub struct Styled {
    enabled: bool,
}

impl Styled {
    pub fn new() -> Self {
        let disabled =
            std::env::var("TRUCITE_NO_COLOR").is_ok() || std::env::var("NO_COLOR").is_ok();
        Self { enabled: !disabled }
    }

    pub fn ok_sym(&self) -> &'static str {
        if self.enabled {
            "\x1b[32m\u{2713}\x1b[0m"
        } else {
            "[OK]"
        }
    }

    pub fn warn_sym(&self) -> &'static str {
        if self.enabled {
            "\x1b[33m!\x1b[0m"
        } else {
            "[!!]"
        }
    }

    pub fn err_sym(&self) -> &'static str {
        if self.enabled {
            "\x1b[31m\u{2717}\x1b[0m"
        } else {
            "[xx]"
        }
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }

    pub fn dim(&self, s: &str) -> String {
        self.paint("90", s)
    }

    pub fn green(&self, s: &str) -> String {
        self.paint("32", s)
    }

    pub fn yellow(&self, s: &str) -> String {
        self.paint("33", s)
    }

    pub fn red(&self, s: &str) -> String {
        self.paint("31", s)
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.enabled {
            format!("\x1b[{code}m{s}\x1b[0m")
        } else {
            s.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_styling_is_plain() {
        let s = Styled { enabled: false };
        assert_eq!(s.ok_sym(), "[OK]");
        assert_eq!(s.bold("text"), "text");
        assert_eq!(s.red("text"), "text");
    }

    #[test]
    fn test_enabled_styling_wraps_in_escapes() {
        let s = Styled { enabled: true };
        assert!(s.green("go").starts_with("\x1b[32m"));
        assert!(s.green("go").ends_with("\x1b[0m"));
    }
}
