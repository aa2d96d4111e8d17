//! Audit trail: integrity fingerprints plus the append-only JSONL log.

pub mod logger;

use sha2::{Digest, Sha256};

use crate::protocol::Gate;

/// Encode bytes as hex string.
fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Sha-256 of a UTF-8 string as lowercase hex.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex_encode(&hasher.finalize())
}

/// Fingerprint binding a verification event to its inputs and outcome.
///
/// Field order is part of the contract; reordering would change every
/// fingerprint ever emitted.
pub fn audit_fingerprint(
    event_id: &str,
    policy_hash: &str,
    score: u32,
    gate: Gate,
    text: &str,
) -> String {
    sha256_hex(&format!(
        "{event_id}|{policy_hash}|{score}|{}|{text}",
        gate.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_hex_known_vector() {
        assert_eq!(
            sha256_hex("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = audit_fingerprint("ev-1", "hash", 85, Gate::Allow, "text");
        let b = audit_fingerprint("ev-1", "hash", 85, Gate::Allow, "text");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_fingerprint_binds_every_input() {
        let base = audit_fingerprint("ev-1", "hash", 85, Gate::Allow, "text");
        assert_ne!(base, audit_fingerprint("ev-2", "hash", 85, Gate::Allow, "text"));
        assert_ne!(base, audit_fingerprint("ev-1", "other", 85, Gate::Allow, "text"));
        assert_ne!(base, audit_fingerprint("ev-1", "hash", 84, Gate::Allow, "text"));
        assert_ne!(base, audit_fingerprint("ev-1", "hash", 85, Gate::Review, "text"));
        assert_ne!(base, audit_fingerprint("ev-1", "hash", 85, Gate::Allow, "other"));
    }
}
