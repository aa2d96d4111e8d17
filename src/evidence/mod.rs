//! Evidence grounding: match claims against reference material.
//!
//! Defines the `EvidenceSource` trait that abstracts over where references
//! come from (currently the seed corpus) plus the overlap rule for
//! user-supplied evidence text.

pub mod corpus;

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;

use crate::protocol::ReferenceHit;
use corpus::SEED_REFERENCES;

/// Minimum shared significant words for user evidence to ground a claim.
const EVIDENCE_OVERLAP_WORDS: usize = 2;

/// Words at or below this length carry no grounding signal.
const MIN_SIGNIFICANT_LEN: usize = 3;

/// Longest excerpt of user evidence quoted back in a reference hit.
const EVIDENCE_EXCERPT_CHARS: usize = 120;

/// A source of reference material that can ground claims.
#[async_trait]
pub trait EvidenceSource: Send + Sync {
    /// Human-readable source name for logs and doctor output.
    fn name(&self) -> &str;
    /// Find references supporting a claim. An empty vec means ungrounded.
    async fn ground(&self, claim_text: &str) -> Result<Vec<ReferenceHit>>;
}

/// Grounding against the built-in seed corpus. Keyword substring match with
/// a one-hit threshold per entry.
pub struct SeedCorpus;

#[async_trait]
impl EvidenceSource for SeedCorpus {
    fn name(&self) -> &str {
        "seed-corpus"
    }

    async fn ground(&self, claim_text: &str) -> Result<Vec<ReferenceHit>> {
        let lower = claim_text.to_lowercase();
        let mut hits = Vec::new();
        for entry in SEED_REFERENCES {
            let matched = entry.keywords.iter().filter(|kw| lower.contains(*kw)).count();
            if matched >= 1 {
                hits.push(ReferenceHit {
                    title: entry.title.to_string(),
                    url: entry.url.to_string(),
                    matched: entry.snippet.to_string(),
                });
            }
        }
        Ok(hits)
    }
}

fn significant_words(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > MIN_SIGNIFICANT_LEN)
        .map(str::to_string)
        .collect()
}

/// Whether user-supplied evidence text grounds a claim: the two must share
/// at least two significant words.
pub fn evidence_overlap(claim_text: &str, evidence: &str) -> bool {
    let claim_words = significant_words(claim_text);
    let evidence_words = significant_words(evidence);
    claim_words.intersection(&evidence_words).count() >= EVIDENCE_OVERLAP_WORDS
}

/// Reference hit for a claim grounded by user-supplied evidence.
pub fn user_evidence_hit(evidence: &str) -> ReferenceHit {
    let excerpt: String = evidence.trim().chars().take(EVIDENCE_EXCERPT_CHARS).collect();
    ReferenceHit {
        title: "User-supplied evidence".to_string(),
        url: String::new(),
        matched: excerpt,
    }
}

/// Trust tier over the whole input, from grounded-claim coverage.
pub fn trust_tier(total: usize, corpus_grounded: usize, user_grounded: usize) -> &'static str {
    if total == 0 {
        return "ungrounded";
    }
    if corpus_grounded == total {
        "corroborated"
    } else if corpus_grounded > 0 {
        "partial"
    } else if user_grounded > 0 {
        "unverified"
    } else {
        "ungrounded"
    }
}
