//! Three-tier environment merge plus per-recipe resolution. Grounded on
//! `original_source/src/frago/recipes/env_loader.py`'s `EnvLoader`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::context::WorkflowContext;
use crate::error::EnvError;
use crate::parser::load_env_file;

/// A single recipe-declared env var requirement (name is the map key).
#[derive(Debug, Clone)]
pub struct EnvVarRequirement {
    pub required: bool,
    pub default: Option<String>,
}

pub struct EnvLoader {
    user_env_path: PathBuf,
    project_env_path: PathBuf,
    cached: std::sync::OnceLock<BTreeMap<String, String>>,
}

impl EnvLoader {
    /// `project_root` is the directory whose `.frago/.env` is consulted;
    /// the user tier is always `~/.frago/.env`.
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        let user_env_path = directories::BaseDirs::new()
            .map(|d| d.home_dir().join(".frago").join(".env"))
            .unwrap_or_else(|| PathBuf::from(".frago/.env"));
        Self {
            user_env_path,
            project_env_path: project_root.into().join(".frago").join(".env"),
            cached: std::sync::OnceLock::new(),
        }
    }

    #[cfg(test)]
    fn with_paths(user_env_path: PathBuf, project_env_path: PathBuf) -> Self {
        Self {
            user_env_path,
            project_env_path,
            cached: std::sync::OnceLock::new(),
        }
    }

    /// Merges process env, user `.env`, and project `.env`, in that
    /// precedence order (project wins). Cached after first call.
    pub fn load_all(&self) -> Result<&BTreeMap<String, String>, EnvError> {
        if let Some(cached) = self.cached.get() {
            return Ok(cached);
        }

        let mut merged: BTreeMap<String, String> = std::env::vars().collect();
        merged.extend(load_env_file(&self.user_env_path)?);
        merged.extend(load_env_file(&self.project_env_path)?);

        Ok(self.cached.get_or_init(|| merged))
    }

    /// Resolves the full environment for a recipe invocation: merged
    /// tiers, overlaid by `workflow_context`, overlaid by
    /// `cli_overrides` (highest precedence). Declared vars missing from
    /// the result receive their `default`; vars still missing and
    /// `required` are collected into a single `MissingRequired` error.
    pub fn resolve_for_recipe(
        &self,
        declarations: &BTreeMap<String, EnvVarRequirement>,
        workflow_context: Option<&WorkflowContext>,
        cli_overrides: &BTreeMap<String, String>,
    ) -> Result<BTreeMap<String, String>, EnvError> {
        let mut merged = self.load_all()?.clone();
        if let Some(ctx) = workflow_context {
            merged.extend(ctx.as_dict().clone());
        }
        merged.extend(cli_overrides.clone());

        let mut missing = Vec::new();
        for (name, req) in declarations {
            if merged.contains_key(name) {
                continue;
            }
            if let Some(default) = &req.default {
                merged.insert(name.clone(), default.clone());
            } else if req.required {
                missing.push(name.clone());
            }
        }

        if !missing.is_empty() {
            missing.sort();
            return Err(EnvError::MissingRequired(missing));
        }

        Ok(merged)
    }

    /// Filters a resolved environment down to just the recipe's
    /// declared variables, for passing to a subprocess.
    pub fn recipe_env_subset(
        resolved: &BTreeMap<String, String>,
        declarations: &BTreeMap<String, EnvVarRequirement>,
    ) -> BTreeMap<String, String> {
        declarations
            .keys()
            .filter_map(|name| resolved.get(name).map(|v| (name.clone(), v.clone())))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn requirement(required: bool, default: Option<&str>) -> EnvVarRequirement {
        EnvVarRequirement {
            required,
            default: default.map(str::to_string),
        }
    }

    #[test]
    fn project_env_overrides_user_env_overrides_process_env() {
        let dir = tempdir().unwrap();
        let user_path = dir.path().join("user.env");
        let project_path = dir.path().join("project.env");
        std::fs::write(&user_path, "SHARED=from-user\nUSER_ONLY=u\n").unwrap();
        std::fs::write(&project_path, "SHARED=from-project\n").unwrap();

        std::env::set_var("SHARED", "from-process");
        let loader = EnvLoader::with_paths(user_path, project_path);
        let merged = loader.load_all().unwrap();
        std::env::remove_var("SHARED");

        assert_eq!(merged.get("SHARED").unwrap(), "from-project");
        assert_eq!(merged.get("USER_ONLY").unwrap(), "u");
    }

    #[test]
    fn resolve_applies_default_then_flags_missing_required() {
        let dir = tempdir().unwrap();
        let loader = EnvLoader::with_paths(dir.path().join("user.env"), dir.path().join("project.env"));

        let mut declarations = BTreeMap::new();
        declarations.insert("TOKEN".to_string(), requirement(true, None));
        declarations.insert("REGION".to_string(), requirement(false, Some("us-east-1")));

        let result = loader.resolve_for_recipe(&declarations, None, &BTreeMap::new());
        match result {
            Err(EnvError::MissingRequired(names)) => assert_eq!(names, vec!["TOKEN".to_string()]),
            other => panic!("expected MissingRequired, got {other:?}"),
        }
    }

    #[test]
    fn cli_override_beats_workflow_context_beats_file_tiers() {
        let dir = tempdir().unwrap();
        let project_path = dir.path().join("project.env");
        std::fs::write(&project_path, "TOKEN=from-file\n").unwrap();
        let loader = EnvLoader::with_paths(dir.path().join("user.env"), project_path);

        let mut declarations = BTreeMap::new();
        declarations.insert("TOKEN".to_string(), requirement(true, None));

        let mut ctx = WorkflowContext::new();
        ctx.set("TOKEN", "from-workflow");

        let mut overrides = BTreeMap::new();
        overrides.insert("TOKEN".to_string(), "from-cli".to_string());

        let resolved = loader.resolve_for_recipe(&declarations, Some(&ctx), &overrides).unwrap();
        assert_eq!(resolved.get("TOKEN").unwrap(), "from-cli");
    }

    #[test]
    fn recipe_env_subset_filters_to_declared_names() {
        let mut resolved = BTreeMap::new();
        resolved.insert("TOKEN".to_string(), "abc".to_string());
        resolved.insert("UNRELATED".to_string(), "zzz".to_string());

        let mut declarations = BTreeMap::new();
        declarations.insert("TOKEN".to_string(), requirement(true, None));

        let subset = EnvLoader::recipe_env_subset(&resolved, &declarations);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.get("TOKEN").unwrap(), "abc");
    }
}
