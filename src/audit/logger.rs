//! JSONL audit logger — append-only log of all verification events.
//!
//! Features:
//! - Append-only JSONL format for easy parsing
//! - Automatic log rotation when file exceeds `MAX_LOG_SIZE` (100MB)
//! - Rotated files named `.1`, `.2`, etc. (max 5 rotations)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Maximum audit log size before rotation (100 MB).
const MAX_LOG_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum number of rotated log files to keep.
const MAX_ROTATIONS: u32 = 5;

/// A single audit record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: String,
    pub event_id: String,
    pub endpoint: String,
    pub policy_mode: String,
    pub score: u32,
    pub gate: String,
    pub claim_count: usize,
    pub latency_ms: f64,
    pub fingerprint: String,
}

/// Append-only JSONL audit logger with automatic rotation.
pub struct AuditLogger {
    file: File,
    path: PathBuf,
    /// Approximate current size (may drift slightly; re-checked on rotation).
    current_size: u64,
}

impl AuditLogger {
    /// Open or create the audit log file.
    pub fn open(path: &PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open audit log: {}", path.display()))?;

        let current_size = file.metadata().map(|m| m.len()).unwrap_or(0);

        Ok(Self {
            file,
            path: path.clone(),
            current_size,
        })
    }

    /// Open the default audit log at ~/.trucite/audit.jsonl.
    pub fn default_logger() -> Result<Self> {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".trucite")
            .join("audit.jsonl");
        Self::open(&path)
    }

    /// Append an audit record.
    pub fn log(&mut self, record: &AuditRecord) -> Result<()> {
        // Check if rotation is needed before writing
        if self.current_size >= MAX_LOG_SIZE {
            self.rotate()?;
        }

        let json = serde_json::to_string(record)?;
        let bytes_written = writeln!(self.file, "{json}")
            .map(|()| json.len() as u64 + 1)
            .unwrap_or(0);
        self.current_size += bytes_written;
        Ok(())
    }

    /// Rotate log files: audit.jsonl → audit.jsonl.1, .1 → .2, etc.
    fn rotate(&mut self) -> Result<()> {
        // Close current file by dropping and reopening later
        self.file.flush()?;

        // Shift existing rotated files
        for i in (1..MAX_ROTATIONS).rev() {
            let from = rotation_path(&self.path, i);
            let to = rotation_path(&self.path, i + 1);
            if from.exists() {
                let _ = std::fs::rename(&from, &to);
            }
        }

        // Rename current → .1
        let first_rotation = rotation_path(&self.path, 1);
        let _ = std::fs::rename(&self.path, &first_rotation);

        // Delete oldest if over limit
        let oldest = rotation_path(&self.path, MAX_ROTATIONS);
        if oldest.exists() {
            let _ = std::fs::remove_file(&oldest);
        }

        // Reopen fresh log
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| "failed to reopen audit log after rotation")?;
        self.current_size = 0;

        Ok(())
    }
}

/// Build path for a rotated log file: `audit.jsonl.1`, `audit.jsonl.2`, etc.
fn rotation_path(base: &std::path::Path, index: u32) -> PathBuf {
    let name = format!(
        "{}.{index}",
        base.file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audit.jsonl")
    );
    base.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(event_id: &str) -> AuditRecord {
        AuditRecord {
            timestamp: Utc::now().to_rfc3339(),
            event_id: event_id.to_string(),
            endpoint: "/verify".to_string(),
            policy_mode: "standard".to_string(),
            score: 87,
            gate: "ALLOW".to_string(),
            claim_count: 2,
            latency_ms: 1.5,
            fingerprint: "f".repeat(64),
        }
    }

    #[test]
    fn test_log_appends_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut logger = AuditLogger::open(&path).unwrap();

        logger.log(&record("ev-1")).unwrap();
        logger.log(&record("ev-2")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.event_id, "ev-1");
        assert_eq!(first.gate, "ALLOW");
    }

    #[test]
    fn test_reopen_resumes_appending() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");

        AuditLogger::open(&path).unwrap().log(&record("ev-1")).unwrap();
        AuditLogger::open(&path).unwrap().log(&record("ev-2")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_rotation_shifts_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.jsonl");
        let mut logger = AuditLogger::open(&path).unwrap();

        logger.log(&record("ev-1")).unwrap();
        // Force the next append over the rotation threshold.
        logger.current_size = MAX_LOG_SIZE;
        logger.log(&record("ev-2")).unwrap();

        let rotated = std::fs::read_to_string(rotation_path(&path, 1)).unwrap();
        assert!(rotated.contains("ev-1"));

        let fresh = std::fs::read_to_string(&path).unwrap();
        assert!(fresh.contains("ev-2"));
        assert!(!fresh.contains("ev-1"));
    }

    #[test]
    fn test_rotation_path_naming() {
        let base = PathBuf::from("/tmp/audit.jsonl");
        assert_eq!(rotation_path(&base, 1), PathBuf::from("/tmp/audit.jsonl.1"));
        assert_eq!(rotation_path(&base, 5), PathBuf::from("/tmp/audit.jsonl.5"));
    }
}
