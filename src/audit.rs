//! Audit trail — one JSON record per delivery attempt outcome.
//!
//! The recorder is a pure observer: it never influences control flow, and a
//! failed write is logged rather than propagated.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit record, serialized as a single JSON line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub timestamp: DateTime<Utc>,
    pub request_type: String,
    pub user: String,
    pub status: String,
    pub cluster: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuditRecord {
    /// Build a record stamped with the current time.
    pub fn now(
        request_type: &str,
        user: &str,
        status: &str,
        cluster: &str,
        error: Option<&str>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            request_type: request_type.to_string(),
            user: user.to_string(),
            status: status.to_string(),
            cluster: cluster.to_string(),
            error: error.map(str::to_string),
        }
    }
}

/// Append-only sink for audit records.
pub trait AuditSink: Send + Sync {
    /// Append one record. Implementations must not fail the request flow.
    fn record(&self, record: &AuditRecord);
}

/// File-backed sink writing one JSON object per line.
///
/// Each append is a single self-contained write, so independent request
/// flows can share one sink.
pub struct JsonLinesAudit {
    file: Mutex<File>,
}

impl JsonLinesAudit {
    /// Open (or create) the audit log at `path` in append mode.
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for JsonLinesAudit {
    fn record(&self, record: &AuditRecord) {
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize audit record");
                return;
            }
        };

        let mut file = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Err(e) = writeln!(file, "{line}") {
            tracing::warn!(error = %e, "Failed to append audit record");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_without_error_field_when_none() {
        let record = AuditRecord::now("Quota", "alice", "bot_success", "cluster", None);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["request_type"], "Quota");
        assert_eq!(json["status"], "bot_success");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn record_includes_error_field_when_present() {
        let record = AuditRecord::now("Help", "bob", "bot_failed", "cluster", Some("timeout"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["error"], "timeout");
    }

    #[test]
    fn json_lines_sink_appends_one_line_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");
        let sink = JsonLinesAudit::open(&path).unwrap();

        sink.record(&AuditRecord::now("Quota", "alice", "bot_failed", "c", Some("down")));
        sink.record(&AuditRecord::now("Quota", "alice", "email_success", "c", None));

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: AuditRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first.status, "bot_failed");
        assert_eq!(first.error.as_deref(), Some("down"));

        let second: AuditRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.status, "email_success");
        assert!(second.error.is_none());
    }

    #[test]
    fn json_lines_sink_reopens_in_append_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("audit.log");

        {
            let sink = JsonLinesAudit::open(&path).unwrap();
            sink.record(&AuditRecord::now("Help", "bob", "bot_success", "c", None));
        }
        {
            let sink = JsonLinesAudit::open(&path).unwrap();
            sink.record(&AuditRecord::now("Help", "bob", "bot_success", "c", None));
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
