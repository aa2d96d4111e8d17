//! Heuristic claim scorer and score aggregation.
//!
//! Scores are deterministic keyword heuristics in 0..=100. The aggregate is a
//! confidence-weighted mean over all claims, truncated to an integer.

use rayon::prelude::*;

use crate::claims::Claim;

/// A claim with its heuristic score attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredClaim {
    pub claim: Claim,
    pub score: u32,
}

/// Score a single claim's text.
///
/// The table is ordered most-specific first; the first matching row wins.
pub fn score_claim_text(text: &str) -> u32 {
    let lower = text.to_lowercase();
    if lower.contains("made of candy") || (lower.contains("moon") && lower.contains("candy")) {
        10
    } else if lower.contains("humans") && lower.contains("moon") && lower.contains("1969") {
        92
    } else if lower.contains("moon") {
        60
    } else {
        75
    }
}

/// Score every claim. Scoring is pure per-claim work, so large pastes fan
/// out across the rayon pool.
pub fn score_claims(claims: &[Claim]) -> Vec<ScoredClaim> {
    claims
        .par_iter()
        .map(|claim| ScoredClaim {
            claim: claim.clone(),
            score: score_claim_text(&claim.text),
        })
        .collect()
}

/// Confidence-weighted aggregate: `sum(score * weight) / sum(weight)`,
/// truncated. Zero when there are no claims.
pub fn aggregate_score(scored: &[ScoredClaim]) -> u32 {
    let weight_sum: u64 = scored.iter().map(|s| u64::from(s.claim.weight)).sum();
    if weight_sum == 0 {
        return 0;
    }
    let weighted: u64 = scored
        .iter()
        .map(|s| u64::from(s.score) * u64::from(s.claim.weight))
        .sum();
    (weighted / weight_sum) as u32
}

/// Normalized spread of claim scores: `(max - min) / 100`. Zero with fewer
/// than two claims.
pub fn volatility(scored: &[ScoredClaim]) -> f64 {
    if scored.len() < 2 {
        return 0.0;
    }
    let max = scored.iter().map(|s| s.score).max().unwrap_or(0);
    let min = scored.iter().map(|s| s.score).min().unwrap_or(0);
    f64::from(max - min) / 100.0
}
