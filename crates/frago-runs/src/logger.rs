//! Append-only JSONL run logger. Grounded on `csa-session`'s
//! `event_writer.rs` file-handling idiom, deliberately NOT copying its
//! batched flush policy: spec.md §4.6 requires a flush on every single
//! write.

use std::fs::OpenOptions;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::error::RunError;
use crate::models::{ActionType, ExecutionMethod, InsightEntry, LogEntry, LogStatus};
use crate::utils::ensure_directory_exists;

pub struct RunLogger {
    log_file: PathBuf,
}

impl RunLogger {
    pub fn new(run_dir: &Path) -> Self {
        Self {
            log_file: run_dir.join("logs").join("execution.jsonl"),
        }
    }

    pub fn write_log(
        &self,
        step: &str,
        status: LogStatus,
        action_type: ActionType,
        execution_method: ExecutionMethod,
        data: serde_json::Value,
        insights: Vec<InsightEntry>,
    ) -> Result<LogEntry, RunError> {
        if let Some(dir) = self.log_file.parent() {
            ensure_directory_exists(dir)?;
        }

        let entry = LogEntry {
            timestamp: chrono::Utc::now(),
            step: step.to_string(),
            status,
            action_type,
            execution_method,
            data,
            insights,
            schema_version: LogEntry::SCHEMA_VERSION.to_string(),
        };

        let line = serde_json::to_string(&entry)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .map_err(|e| RunError::FileSystem {
                op: "write".into(),
                path: self.log_file.display().to_string(),
                reason: e.to_string(),
            })?;
        writeln!(file, "{line}").map_err(|e| RunError::FileSystem {
            op: "write".into(),
            path: self.log_file.display().to_string(),
            reason: e.to_string(),
        })?;
        file.flush().map_err(|e| RunError::FileSystem {
            op: "write".into(),
            path: self.log_file.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(entry)
    }

    /// Reads entries from the JSONL file. Corrupted lines are skipped (and
    /// logged) unless `skip_corrupted` is false, in which case the first
    /// corrupted line raises.
    pub fn read_logs(&self, limit: Option<usize>, skip_corrupted: bool) -> Result<Vec<LogEntry>, RunError> {
        if !self.log_file.exists() {
            return Ok(Vec::new());
        }

        let file = std::fs::File::open(&self.log_file).map_err(|e| RunError::FileSystem {
            op: "read".into(),
            path: self.log_file.display().to_string(),
            reason: e.to_string(),
        })?;
        let reader = std::io::BufReader::new(file);

        let mut entries = Vec::new();
        for (line_num, line) in reader.lines().enumerate() {
            let line = line.map_err(|e| RunError::FileSystem {
                op: "read".into(),
                path: self.log_file.display().to_string(),
                reason: e.to_string(),
            })?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<LogEntry>(trimmed) {
                Ok(entry) => entries.push(entry),
                Err(e) => {
                    if skip_corrupted {
                        tracing::warn!(line = line_num + 1, error = %e, "skipping corrupted log line");
                        continue;
                    }
                    return Err(RunError::CorruptedLog {
                        path: self.log_file.display().to_string(),
                        line: line_num + 1,
                        reason: e.to_string(),
                    });
                }
            }
        }

        if let Some(limit) = limit {
            let start = entries.len().saturating_sub(limit);
            entries = entries.split_off(start);
        }

        Ok(entries)
    }

    pub fn count_logs(&self) -> usize {
        let Ok(file) = std::fs::File::open(&self.log_file) else {
            return 0;
        };
        std::io::BufReader::new(file)
            .lines()
            .map_while(Result::ok)
            .filter(|l| !l.trim().is_empty())
            .count()
    }

    pub fn get_recent_logs(&self, count: usize) -> Result<Vec<LogEntry>, RunError> {
        self.read_logs(Some(count), true)
    }
}
