//! Mutual-exclusion "current run" context. Only one run may be active at
//! a time per projects directory; the context file records which.
//!
//! `FRAGO_CURRENT_RUN` overrides reads unconditionally (spec.md §4.5):
//! it is meant for CI/script contexts that want to pin a run without
//! touching the on-disk context file.

use std::path::PathBuf;

use chrono::Utc;

use crate::error::RunError;
use crate::models::CurrentRunContext;
use crate::utils::ensure_directory_exists;

const ENV_OVERRIDE: &str = "FRAGO_CURRENT_RUN";
const CONTEXT_FILE: &str = "current_run";

pub struct ContextStore {
    home_dir: PathBuf,
    projects_dir: PathBuf,
}

impl ContextStore {
    /// `home_dir` is `<user-home>/.frago`, where the context file lives as
    /// a sibling of `projects/`; `projects_dir` is `<home_dir>/projects`.
    pub fn new(home_dir: impl Into<PathBuf>, projects_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir: home_dir.into(),
            projects_dir: projects_dir.into(),
        }
    }

    fn context_path(&self) -> PathBuf {
        self.home_dir.join(CONTEXT_FILE)
    }

    /// Sets the active run. Fails if a different run is already active;
    /// setting the same run again just refreshes `last_accessed`.
    pub fn set_current_run(&self, run_id: &str, theme_description: &str) -> Result<CurrentRunContext, RunError> {
        if let Some(existing) = self.read_context_file()? {
            if existing.run_id != run_id && self.run_dir_exists(&existing.run_id) {
                return Err(RunError::ContextAlreadySet {
                    existing: existing.run_id,
                });
            }
        }

        let ctx = CurrentRunContext {
            run_id: run_id.to_string(),
            last_accessed: Utc::now(),
            theme_description: theme_description.to_string(),
            projects_dir: Some(self.projects_dir.display().to_string()),
        };
        self.write_context_file(&ctx)?;
        Ok(ctx)
    }

    /// Returns the active run, honoring `FRAGO_CURRENT_RUN` first. Clears
    /// and returns `ContextNotSet` if the context file points at a run
    /// directory that no longer exists.
    pub fn get_current_run(&self) -> Result<CurrentRunContext, RunError> {
        if let Ok(run_id) = std::env::var(ENV_OVERRIDE) {
            let run_id = run_id.trim().to_string();
            if !run_id.is_empty() {
                return Ok(CurrentRunContext {
                    run_id,
                    last_accessed: Utc::now(),
                    theme_description: String::new(),
                    projects_dir: Some(self.projects_dir.display().to_string()),
                });
            }
        }

        let Some(ctx) = self.read_context_file()? else {
            return Err(RunError::ContextNotSet);
        };

        if !self.run_dir_exists(&ctx.run_id) {
            self.release_context()?;
            return Err(RunError::ContextNotSet);
        }

        Ok(ctx)
    }

    pub fn release_context(&self) -> Result<(), RunError> {
        let path = self.context_path();
        if path.exists() {
            std::fs::remove_file(&path).map_err(|e| RunError::FileSystem {
                op: "remove".into(),
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        }
        Ok(())
    }

    fn run_dir_exists(&self, run_id: &str) -> bool {
        self.projects_dir.join(run_id).is_dir()
    }

    fn read_context_file(&self) -> Result<Option<CurrentRunContext>, RunError> {
        let path = self.context_path();
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| RunError::FileSystem {
            op: "read".into(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write_context_file(&self, ctx: &CurrentRunContext) -> Result<(), RunError> {
        ensure_directory_exists(&self.home_dir)?;
        let path = self.context_path();
        let content = serde_json::to_string_pretty(ctx)?;
        std::fs::write(&path, content).map_err(|e| RunError::FileSystem {
            op: "write".into(),
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use tempfile::tempdir;

    fn make_run_dir(projects_dir: &Path, run_id: &str) {
        std::fs::create_dir_all(projects_dir.join(run_id)).unwrap();
    }

    #[test]
    fn set_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        make_run_dir(&projects_dir, "20260730-upwork-jobs");
        let store = ContextStore::new(dir.path(), &projects_dir);
        store.set_current_run("20260730-upwork-jobs", "Upwork jobs search").unwrap();

        let ctx = store.get_current_run().unwrap();
        assert_eq!(ctx.run_id, "20260730-upwork-jobs");
    }

    #[test]
    fn setting_a_different_active_run_fails() {
        let dir = tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        make_run_dir(&projects_dir, "run-a");
        make_run_dir(&projects_dir, "run-b");
        let store = ContextStore::new(dir.path(), &projects_dir);
        store.set_current_run("run-a", "first").unwrap();

        let result = store.set_current_run("run-b", "second");
        assert!(matches!(result, Err(RunError::ContextAlreadySet { existing }) if existing == "run-a"));
    }

    #[test]
    fn resetting_same_run_refreshes_timestamp() {
        let dir = tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        make_run_dir(&projects_dir, "run-a");
        let store = ContextStore::new(dir.path(), &projects_dir);
        store.set_current_run("run-a", "first").unwrap();
        let result = store.set_current_run("run-a", "first again");
        assert!(result.is_ok());
    }

    #[test]
    fn missing_context_is_not_set_error() {
        let dir = tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        let store = ContextStore::new(dir.path(), &projects_dir);
        assert!(matches!(store.get_current_run(), Err(RunError::ContextNotSet)));
    }

    #[test]
    fn stale_run_dir_auto_clears_context() {
        let dir = tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        make_run_dir(&projects_dir, "run-a");
        let store = ContextStore::new(dir.path(), &projects_dir);
        store.set_current_run("run-a", "first").unwrap();
        std::fs::remove_dir_all(projects_dir.join("run-a")).unwrap();

        assert!(matches!(store.get_current_run(), Err(RunError::ContextNotSet)));
        assert!(!store.context_path().exists());
    }

    #[test]
    fn env_override_takes_precedence() {
        let dir = tempdir().unwrap();
        let projects_dir = dir.path().join("projects");
        let store = ContextStore::new(dir.path(), &projects_dir);
        std::env::set_var(ENV_OVERRIDE, "overridden-run");
        let ctx = store.get_current_run().unwrap();
        std::env::remove_var(ENV_OVERRIDE);
        assert_eq!(ctx.run_id, "overridden-run");
    }
}
