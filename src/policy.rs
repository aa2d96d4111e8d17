//! Policy modes and the decision gate.
//!
//! A mode maps the aggregate score onto ALLOW/REVIEW/BLOCK through a pair of
//! thresholds. The policy table is versioned and hashed so clients can detect
//! drift between what they tested against and what the server runs.

use serde::{Deserialize, Serialize};

use crate::audit::sha256_hex;
use crate::protocol::{Decision, Gate};

/// Version label stamped into responses as `policy_version`.
pub const POLICY_VERSION: &str = "v2";

/// Gate thresholds for one policy mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Scores at or above this gate ALLOW.
    pub allow_at: u32,
    /// Scores below this gate BLOCK.
    pub block_below: u32,
}

/// Policy modes a request can select.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyMode {
    #[default]
    Standard,
    Strict,
    Permissive,
}

impl PolicyMode {
    pub const ALL: [PolicyMode; 3] = [Self::Standard, Self::Strict, Self::Permissive];

    /// Parse a mode label case-insensitively. Clients may send anything;
    /// unknown labels fall back to standard.
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s.map(|m| m.trim().to_ascii_lowercase()).as_deref() {
            Some("strict") => Self::Strict,
            Some("permissive") => Self::Permissive,
            _ => Self::Standard,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Strict => "strict",
            Self::Permissive => "permissive",
        }
    }

    pub fn thresholds(&self) -> Thresholds {
        match self {
            Self::Standard => Thresholds { allow_at: 85, block_below: 40 },
            Self::Strict => Thresholds { allow_at: 92, block_below: 60 },
            Self::Permissive => Thresholds { allow_at: 70, block_below: 25 },
        }
    }
}

impl std::fmt::Display for PolicyMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Evaluate the gate for a score under a mode.
pub fn evaluate(mode: PolicyMode, score: u32) -> Decision {
    let t = mode.thresholds();
    if score >= t.allow_at {
        Decision {
            action: Gate::Allow,
            reason: format!("score {score} meets the {mode} allow threshold {}", t.allow_at),
        }
    } else if score < t.block_below {
        Decision {
            action: Gate::Block,
            reason: format!("score {score} is below the {mode} block threshold {}", t.block_below),
        }
    } else {
        Decision {
            action: Gate::Review,
            reason: format!(
                "score {score} falls in the {mode} review band {}..{}",
                t.block_below, t.allow_at
            ),
        }
    }
}

/// Hash of the canonical policy table. Changes whenever any threshold
/// changes.
pub fn policy_hash() -> String {
    let table: String = PolicyMode::ALL
        .iter()
        .map(|m| {
            let t = m.thresholds();
            format!("{}:{}:{}", m.as_str(), t.allow_at, t.block_below)
        })
        .collect::<Vec<_>>()
        .join("|");
    sha256_hex(&table)
}
