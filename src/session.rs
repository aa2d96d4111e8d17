//! Last-exchange persistence for the copy helpers.
//!
//! Each successful verification stores the exact request payload and raw
//! backend response at `~/.trucite/last_exchange.json`, so `trucite last`
//! can reproduce either one byte-for-byte later.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One recorded request/response exchange.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastExchange {
    /// The request body exactly as it was sent.
    pub payload: Value,
    /// The response body exactly as it came back.
    pub response: Value,
    /// The endpoint that served the response.
    pub endpoint: String,
    /// RFC 3339 timestamp of when the exchange was recorded.
    pub saved_at: String,
}

impl LastExchange {
    pub fn new(payload: Value, response: Value, endpoint: String) -> Self {
        Self {
            payload,
            response,
            endpoint,
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Path of the persisted exchange file.
pub fn exchange_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(".trucite")
        .join("last_exchange.json")
}

/// Persist an exchange, replacing any previous one.
pub fn store(exchange: &LastExchange) -> Result<()> {
    store_at(&exchange_path(), exchange)
}

pub fn store_at(path: &Path, exchange: &LastExchange) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, serde_json::to_string_pretty(exchange)?)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load the persisted exchange. A missing or unreadable file is simply no
/// exchange.
pub fn load() -> Option<LastExchange> {
    load_at(&exchange_path())
}

pub fn load_at(path: &Path) -> Option<LastExchange> {
    let content = std::fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_exchange_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_exchange.json");

        let exchange = LastExchange::new(
            json!({ "text": "The moon is rock." }),
            json!({ "score": 60, "verdict": "Questionable" }),
            "http://127.0.0.1:7311/verify".to_string(),
        );
        store_at(&path, &exchange).unwrap();

        let loaded = load_at(&path).unwrap();
        assert_eq!(loaded.payload, exchange.payload);
        assert_eq!(loaded.response, exchange.response);
        assert_eq!(loaded.endpoint, exchange.endpoint);
        assert_eq!(loaded.saved_at, exchange.saved_at);
    }

    #[test]
    fn test_store_replaces_previous_exchange() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_exchange.json");

        let first = LastExchange::new(json!({ "text": "one" }), json!({ "score": 10 }), "a".into());
        let second = LastExchange::new(json!({ "text": "two" }), json!({ "score": 92 }), "b".into());
        store_at(&path, &first).unwrap();
        store_at(&path, &second).unwrap();

        let loaded = load_at(&path).unwrap();
        assert_eq!(loaded.payload["text"], "two");
        assert_eq!(loaded.endpoint, "b");
    }

    #[test]
    fn test_load_missing_or_corrupt_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_at(&dir.path().join("nope.json")).is_none());

        let path = dir.path().join("garbage.json");
        std::fs::write(&path, "not json at all").unwrap();
        assert!(load_at(&path).is_none());
    }

    #[test]
    fn test_store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep").join("nested").join("last.json");

        let exchange = LastExchange::new(json!({}), json!({}), "x".into());
        store_at(&path, &exchange).unwrap();
        assert!(path.exists());
    }
}
