// Copyright 2026 TruCite Contributors
// SPDX-License-Identifier: Apache-2.0

//! TruCite Event Bus — typed events from the verification pipeline.
//!
//! The EventBus is a `tokio::sync::broadcast` channel that carries
//! [`TruCiteEvent`] values. Any consumer — REST SSE endpoint, dashboards,
//! log files — can subscribe independently. When no subscribers exist,
//! events are silently dropped (zero overhead).

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Every event the runtime emits. Serialized to JSON for SSE streaming.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TruCiteEvent {
    // ── Verification Events ───────────────
    /// A verification request was accepted and assigned an event id.
    VerifyStarted {
        event_id: String,
        endpoint: String,
        policy_mode: String,
        text_chars: usize,
        timestamp: String,
    },
    /// Claim extraction finished for a request.
    ClaimsExtracted {
        event_id: String,
        claim_count: usize,
        factual: usize,
    },
    /// Scoring and aggregation finished for a request.
    VerifyScored {
        event_id: String,
        score: u32,
        verdict: String,
    },
    /// The full pipeline finished and a response was emitted.
    VerifyComplete {
        event_id: String,
        score: u32,
        gate: String,
        latency_ms: f64,
    },
    /// The pipeline failed with an error.
    VerifyFailed { event_id: String, error: String },

    // ── System Events ─────────────────────
    /// TruCite runtime started.
    RuntimeStarted { version: String, http_port: u16 },
}

/// The central event bus for the runtime.
///
/// All pipeline stages emit events through this bus. Consumers subscribe
/// to receive a stream of all events.
pub struct EventBus {
    sender: broadcast::Sender<TruCiteEvent>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit an event to all subscribers. Silently ignores if no subscribers.
    pub fn emit(&self, event: TruCiteEvent) {
        let _ = self.sender.send(event);
    }

    /// Subscribe to receive all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<TruCiteEvent> {
        self.sender.subscribe()
    }
}

/// Check if an event belongs to a specific verification (by event id).
pub fn event_matches_id(event: &TruCiteEvent, event_id: &str) -> bool {
    match event {
        TruCiteEvent::VerifyStarted { event_id: id, .. }
        | TruCiteEvent::ClaimsExtracted { event_id: id, .. }
        | TruCiteEvent::VerifyScored { event_id: id, .. }
        | TruCiteEvent::VerifyComplete { event_id: id, .. }
        | TruCiteEvent::VerifyFailed { event_id: id, .. } => id == event_id,
        // System events are not request-specific — they reach all subscribers
        TruCiteEvent::RuntimeStarted { .. } => true,
    }
}

/// Get the timestamp for the current time.
pub fn now_timestamp() -> String {
    // Use a simple approach without chrono dependency
    let dur = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    let secs = dur.as_secs();
    // Seconds since epoch (consumers can format)
    format!("{secs}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = TruCiteEvent::VerifyStarted {
            event_id: "ev-1".to_string(),
            endpoint: "/verify".to_string(),
            policy_mode: "standard".to_string(),
            text_chars: 42,
            timestamp: "1708276800".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("VerifyStarted"));
        assert!(json.contains("ev-1"));

        // Roundtrip
        let parsed: TruCiteEvent = serde_json::from_str(&json).unwrap();
        match parsed {
            TruCiteEvent::VerifyStarted { event_id, .. } => assert_eq!(event_id, "ev-1"),
            _ => panic!("wrong variant"),
        }
    }

    #[test]
    fn test_verify_complete_serialization() {
        let event = TruCiteEvent::VerifyComplete {
            event_id: "ev-9".to_string(),
            score: 87,
            gate: "ALLOW".to_string(),
            latency_ms: 3.2,
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("VerifyComplete"));
        assert!(json.contains("87"));
    }

    #[test]
    fn test_event_bus_emit_no_subscribers() {
        let bus = EventBus::new(16);
        // Should not panic when no subscribers
        bus.emit(TruCiteEvent::RuntimeStarted {
            version: "1.0.0".to_string(),
            http_port: 7311,
        });
    }

    #[test]
    fn test_event_bus_subscribe_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(TruCiteEvent::VerifyScored {
            event_id: "ev-2".to_string(),
            score: 60,
            verdict: "Needs Verification".to_string(),
        });

        let event = rx.try_recv().unwrap();
        match event {
            TruCiteEvent::VerifyScored { score, .. } => assert_eq!(score, 60),
            _ => panic!("wrong event"),
        }
    }

    #[test]
    fn test_event_matches_id() {
        let event = TruCiteEvent::VerifyScored {
            event_id: "ev-3".to_string(),
            score: 10,
            verdict: "Low Confidence".to_string(),
        };
        assert!(event_matches_id(&event, "ev-3"));
        assert!(!event_matches_id(&event, "ev-4"));

        // System events always match
        let sys = TruCiteEvent::RuntimeStarted {
            version: "1.0.0".to_string(),
            http_port: 7311,
        };
        assert!(event_matches_id(&sys, "anything"));
    }
}
