//! Run Store: create, find, list, archive runs and compute their
//! statistics. Grounded on `original_source/src/frago/run/manager.py`'s
//! `RunManager`.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::RunError;
use crate::logger::RunLogger;
use crate::models::{RunInstance, RunStatus};
use crate::utils::{ensure_directory_exists, generate_theme_slug, is_valid_run_id};

const METADATA_FILE: &str = ".metadata.json";
const SUBDIRS: [&str; 4] = ["logs", "screenshots", "scripts", "outputs"];

pub struct RunStore {
    projects_dir: PathBuf,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RunStatistics {
    pub log_entries: usize,
    pub screenshots: usize,
    pub scripts: usize,
    pub disk_usage_bytes: u64,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub instance: RunInstance,
    pub log_count: usize,
    pub screenshot_count: usize,
}

impl RunStore {
    pub fn new(projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            projects_dir: projects_dir.into(),
        }
    }

    pub fn run_dir(&self, run_id: &str) -> PathBuf {
        self.projects_dir.join(run_id)
    }

    /// Creates a new run directory tree and seeds `.metadata.json`. If
    /// `run_id` is not given, a date-prefixed slug is generated from
    /// `theme_description`.
    pub fn create_run(&self, theme_description: &str, run_id: Option<&str>) -> Result<RunInstance, RunError> {
        let run_id = match run_id {
            Some(id) => {
                if !is_valid_run_id(id) {
                    return Err(RunError::InvalidRunId {
                        id: id.to_string(),
                        reason: "must match ^[a-z0-9-]{1,50}$".into(),
                    });
                }
                id.to_string()
            }
            None => {
                let slug = generate_theme_slug(theme_description, 40);
                format!("{}-{}", Utc::now().format("%Y%m%d"), slug)
            }
        };

        let run_dir = self.run_dir(&run_id);
        if run_dir.exists() {
            return Err(RunError::InvalidRunId {
                id: run_id,
                reason: "run directory already exists".into(),
            });
        }

        ensure_directory_exists(&run_dir)?;
        for sub in SUBDIRS {
            ensure_directory_exists(&run_dir.join(sub))?;
        }

        let now = Utc::now();
        let instance = RunInstance {
            run_id: run_id.clone(),
            theme_description: theme_description.to_string(),
            created_at: now,
            last_accessed: now,
            status: RunStatus::Active,
        };
        self.write_metadata(&run_dir, &instance)?;

        Ok(instance)
    }

    pub fn find_run(&self, run_id: &str) -> Result<RunInstance, RunError> {
        let run_dir = self.run_dir(run_id);
        if !run_dir.is_dir() {
            return Err(RunError::NotFound(run_id.to_string()));
        }
        self.read_metadata(&run_dir)
    }

    pub fn list_runs(&self, status: Option<RunStatus>) -> Result<Vec<RunSummary>, RunError> {
        if !self.projects_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut summaries = Vec::new();
        for entry in std::fs::read_dir(&self.projects_dir).map_err(|e| RunError::FileSystem {
            op: "list".into(),
            path: self.projects_dir.display().to_string(),
            reason: e.to_string(),
        })? {
            let entry = entry.map_err(|e| RunError::FileSystem {
                op: "list".into(),
                path: self.projects_dir.display().to_string(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !is_valid_run_id(name) {
                continue;
            }
            let Ok(instance) = self.read_metadata(&path) else {
                continue;
            };
            if let Some(wanted) = status {
                if instance.status != wanted {
                    continue;
                }
            }

            let logger = RunLogger::new(&path);
            summaries.push(RunSummary {
                log_count: logger.count_logs(),
                screenshot_count: count_pngs(&path.join("screenshots")),
                instance,
            });
        }

        summaries.sort_by(|a, b| b.instance.last_accessed.cmp(&a.instance.last_accessed));
        Ok(summaries)
    }

    pub fn archive_run(&self, run_id: &str) -> Result<RunInstance, RunError> {
        let run_dir = self.run_dir(run_id);
        if !run_dir.is_dir() {
            return Err(RunError::NotFound(run_id.to_string()));
        }
        let mut instance = self.read_metadata(&run_dir)?;
        instance.status = RunStatus::Archived;
        instance.last_accessed = Utc::now();
        self.write_metadata(&run_dir, &instance)?;
        Ok(instance)
    }

    pub fn statistics(&self, run_id: &str) -> Result<RunStatistics, RunError> {
        let run_dir = self.run_dir(run_id);
        if !run_dir.is_dir() {
            return Err(RunError::NotFound(run_id.to_string()));
        }

        let logger = RunLogger::new(&run_dir);
        Ok(RunStatistics {
            log_entries: logger.count_logs(),
            screenshots: count_pngs(&run_dir.join("screenshots")),
            scripts: count_entries(&run_dir.join("scripts")),
            disk_usage_bytes: dir_size(&run_dir),
        })
    }

    fn metadata_path(&self, run_dir: &Path) -> PathBuf {
        run_dir.join(METADATA_FILE)
    }

    fn read_metadata(&self, run_dir: &Path) -> Result<RunInstance, RunError> {
        let path = self.metadata_path(run_dir);
        let content = std::fs::read_to_string(&path).map_err(|e| RunError::FileSystem {
            op: "read".into(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    fn write_metadata(&self, run_dir: &Path, instance: &RunInstance) -> Result<(), RunError> {
        let path = self.metadata_path(run_dir);
        let content = serde_json::to_string_pretty(instance)?;
        std::fs::write(&path, content).map_err(|e| RunError::FileSystem {
            op: "write".into(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

fn count_pngs(dir: &Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("png"))
        .count()
}

fn count_entries(dir: &Path) -> usize {
    std::fs::read_dir(dir).map(|it| it.filter_map(Result::ok).count()).unwrap_or(0)
}

fn dir_size(dir: &Path) -> u64 {
    let mut total = 0u64;
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    for entry in entries.filter_map(Result::ok) {
        let path = entry.path();
        if path.is_dir() {
            total += dir_size(&path);
        } else if let Ok(meta) = entry.metadata() {
            total += meta.len();
        }
    }
    total
}
