//! Claim extraction: split input text into sentences and classify each one.
//!
//! Splitting is terminator-based (`.` `!` `?` followed by whitespace) and the
//! terminator stays with its sentence. Fragments of five characters or fewer
//! are noise and are dropped before classification.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Linking-verb fragments that mark a sentence as a factual assertion.
/// Matched case-insensitively with surrounding spaces intact, so "is" inside
/// "island" does not trigger.
const FACTUAL_KEYWORDS: &[&str] = &[
    " is ", " are ", " was ", " were ", " has ", " have ", " will ", " contains ",
];

/// Minimum character length a trimmed fragment must exceed to count as a claim.
const MIN_CLAIM_CHARS: usize = 5;

/// Weight applied to factual claims in the aggregate score.
const FACTUAL_WEIGHT: u32 = 3;

/// Weight applied to unclassified claims.
const UNKNOWN_WEIGHT: u32 = 1;

/// Classification of an extracted claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClaimKind {
    Factual,
    Unknown,
}

impl ClaimKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Factual => "factual",
            Self::Unknown => "unknown",
        }
    }

    /// Confidence weight this kind contributes to the aggregate.
    pub fn weight(&self) -> u32 {
        match self {
            Self::Factual => FACTUAL_WEIGHT,
            Self::Unknown => UNKNOWN_WEIGHT,
        }
    }
}

/// One extracted claim, ready for scoring and grounding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claim {
    pub id: String,
    pub text: String,
    pub kind: ClaimKind,
    pub weight: u32,
}

/// Split text into sentences on terminator-plus-whitespace boundaries.
///
/// The terminator run stays attached to the sentence before it. Trailing text
/// with no terminator is a sentence of its own.
pub fn split_sentences(text: &str) -> Vec<String> {
    let boundary = Regex::new(r"[.!?]+\s+").expect("sentence boundary regex is valid");

    let mut sentences = Vec::new();
    let mut last = 0;
    for m in boundary.find_iter(text) {
        // The match is a run of terminators followed by whitespace; the
        // sentence ends after the terminator run.
        let terminators = m.as_str().trim_end_matches(char::is_whitespace);
        let end = m.start() + terminators.len();
        push_trimmed(&mut sentences, &text[last..end]);
        last = m.end();
    }
    if last < text.len() {
        push_trimmed(&mut sentences, &text[last..]);
    }
    sentences
}

fn push_trimmed(out: &mut Vec<String>, fragment: &str) {
    let trimmed = fragment.trim();
    if trimmed.chars().count() > MIN_CLAIM_CHARS {
        out.push(trimmed.to_string());
    }
}

/// Classify a sentence by keyword scan.
pub fn classify(sentence: &str) -> ClaimKind {
    let lower = sentence.to_lowercase();
    if FACTUAL_KEYWORDS.iter().any(|k| lower.contains(k)) {
        ClaimKind::Factual
    } else {
        ClaimKind::Unknown
    }
}

/// Extract claims from raw input text. Ids are `c1..cN` in input order.
pub fn extract_claims(text: &str) -> Vec<Claim> {
    split_sentences(text)
        .into_iter()
        .enumerate()
        .map(|(i, sentence)| {
            let kind = classify(&sentence);
            Claim {
                id: format!("c{}", i + 1),
                weight: kind.weight(),
                kind,
                text: sentence,
            }
        })
        .collect()
}
