//! Debug operation journal.
//!
//! When `debug_logging` is enabled in the config, every committed board
//! mutation is appended as a JSONL line to `operations.jsonl` in the data
//! directory. The journal exists for inspecting what happened to a board; it
//! is never read back by the engine.

use crate::paths;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Appends operation records to a journal file.
#[derive(Debug, Clone)]
pub struct OperationJournal {
    path: PathBuf,
}

impl OperationJournal {
    /// Journal writing to `operations.jsonl` inside `data_dir`.
    #[must_use]
    pub fn in_data_dir(data_dir: &Path) -> Self {
        Self { path: paths::journal_path(data_dir) }
    }

    /// The journal file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one operation record.
    ///
    /// Errors are silently ignored.
    pub fn record(&self, operation: &str, details: &serde_json::Value) {
        if let Some(parent) = self.path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return;
            }
        }

        let entry = serde_json::json!({
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "operation": operation,
            "details": details,
        });

        let Ok(mut file) = OpenOptions::new().create(true).append(true).open(&self.path) else {
            return;
        };

        let _ = writeln!(file, "{entry}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read_log_lines(journal: &OperationJournal) -> Vec<serde_json::Value> {
        if !journal.path().exists() {
            return vec![];
        }
        let content = std::fs::read_to_string(journal.path()).unwrap();
        content
            .lines()
            .filter(|l| !l.is_empty())
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn test_record_appends_lines() {
        let dir = TempDir::new().unwrap();
        let journal = OperationJournal::in_data_dir(dir.path());

        journal.record("create_group", &serde_json::json!({"date": "1/6/2024"}));
        journal.record("create_list", &serde_json::json!({"date": "1/6/2024", "list": 5}));

        let lines = read_log_lines(&journal);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["operation"], "create_group");
        assert_eq!(lines[0]["details"]["date"], "1/6/2024");
        assert_eq!(lines[1]["details"]["list"], 5);
    }

    #[test]
    fn test_record_entry_format() {
        let dir = TempDir::new().unwrap();
        let journal = OperationJournal::in_data_dir(dir.path());

        journal.record("reset", &serde_json::Value::Null);

        let lines = read_log_lines(&journal);
        let ts = lines[0]["timestamp"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
        assert!(lines[0]["details"].is_null());
    }

    #[test]
    fn test_record_creates_data_dir() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("not-yet");
        let journal = OperationJournal::in_data_dir(&data_dir);

        journal.record("create_group", &serde_json::json!({}));

        assert!(data_dir.exists());
        assert_eq!(read_log_lines(&journal).len(), 1);
    }

    #[test]
    fn test_record_data_dir_creation_fails() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("blocked");
        std::fs::write(&data_dir, "blocking file").unwrap();
        let journal = OperationJournal::in_data_dir(&data_dir);

        // Should not panic, just silently skip
        journal.record("create_group", &serde_json::json!({}));

        assert!(!journal.path().exists());
    }

    #[test]
    fn test_record_file_open_fails() {
        let dir = TempDir::new().unwrap();
        let journal = OperationJournal::in_data_dir(dir.path());
        std::fs::create_dir(journal.path()).unwrap();

        // Should not panic, just silently skip
        journal.record("create_group", &serde_json::json!({}));
    }
}
