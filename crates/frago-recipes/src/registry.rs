//! Recipe discovery and registration. Grounded on
//! `original_source/src/frago/recipes/registry.py`'s `RecipeRegistry`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::RecipeError;
use crate::metadata::{parse_metadata_file, validate_metadata, RecipeMetadata};

const SEARCH_SUBDIRS: [&str; 3] = ["atomic/chrome", "atomic/system", "workflows"];
const DEFAULT_SOURCE: &str = "User";

#[derive(Debug, Clone)]
pub struct Recipe {
    pub metadata: RecipeMetadata,
    pub script_path: PathBuf,
    pub metadata_path: PathBuf,
    pub source: String,
    pub base_dir: PathBuf,
}

impl Recipe {
    pub fn examples_dir(&self) -> PathBuf {
        self.metadata_path
            .parent()
            .map(|p| p.join("examples"))
            .unwrap_or_default()
    }

    pub fn list_examples(&self) -> Vec<PathBuf> {
        let dir = self.examples_dir();
        let Ok(entries) = std::fs::read_dir(&dir) else {
            return Vec::new();
        };
        entries.filter_map(Result::ok).map(|e| e.path()).collect()
    }
}

pub struct RecipeRegistry {
    search_paths: Vec<(String, PathBuf)>,
    recipes: BTreeMap<String, Vec<Recipe>>,
}

impl RecipeRegistry {
    /// `recipes_dir` is `~/.frago/recipes/`, the only source this core
    /// scans; it is always registered under the `User` source label.
    pub fn new(recipes_dir: impl Into<PathBuf>) -> Self {
        Self {
            search_paths: vec![(DEFAULT_SOURCE.to_string(), recipes_dir.into())],
            recipes: BTreeMap::new(),
        }
    }

    pub fn scan(&mut self) {
        self.recipes.clear();
        let paths = self.search_paths.clone();
        for (source, base_dir) in paths {
            self.scan_directory(&source, &base_dir);
        }
        self.validate_dependencies();
    }

    fn scan_directory(&mut self, source: &str, base_dir: &Path) {
        for sub in SEARCH_SUBDIRS {
            let dir = base_dir.join(sub);
            let Ok(entries) = std::fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.filter_map(Result::ok) {
                let candidate = entry.path();
                if !candidate.is_dir() {
                    continue;
                }
                let recipe_md = candidate.join("recipe.md");
                if !recipe_md.is_file() {
                    continue;
                }
                if let Some(recipe) = self.register_recipe(source, base_dir, &recipe_md) {
                    self.recipes.entry(recipe.metadata.name.clone()).or_default().push(recipe);
                }
            }
        }
    }

    /// Parses, validates, and locates the matching script. Any failure
    /// is logged and the candidate is silently skipped, matching the
    /// original registry's scan-tolerance behavior.
    fn register_recipe(&self, source: &str, base_dir: &Path, metadata_path: &Path) -> Option<Recipe> {
        let metadata = match parse_metadata_file(metadata_path) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(path = %metadata_path.display(), error = %e, "skipping recipe: metadata parse failed");
                return None;
            }
        };

        let errors = validate_metadata(&metadata);
        if !errors.is_empty() {
            tracing::warn!(path = %metadata_path.display(), ?errors, "skipping recipe: metadata validation failed");
            return None;
        }

        let candidate_dir = metadata_path.parent()?;
        let script_path = candidate_dir.join(format!("recipe.{}", metadata.runtime.script_extension()));
        if !script_path.is_file() {
            tracing::warn!(path = %metadata_path.display(), "skipping recipe: no matching script for declared runtime");
            return None;
        }

        Some(Recipe {
            metadata,
            script_path,
            metadata_path: metadata_path.to_path_buf(),
            source: source.to_string(),
            base_dir: base_dir.to_path_buf(),
        })
    }

    /// Drops workflow recipes whose declared dependencies aren't all
    /// registered. Silent by design, matching the original.
    fn validate_dependencies(&mut self) {
        let names: std::collections::HashSet<String> = self.recipes.keys().cloned().collect();
        for recipes in self.recipes.values_mut() {
            recipes.retain(|r| r.metadata.dependencies.iter().all(|d| names.contains(d)));
        }
        self.recipes.retain(|_, v| !v.is_empty());
    }

    pub fn find(&self, name: &str, source: Option<&str>) -> Result<&Recipe, RecipeError> {
        let candidates = self.recipes.get(name).ok_or_else(|| {
            RecipeError::NotFound(
                name.to_string(),
                self.search_paths.iter().map(|(_, p)| p.display().to_string()).collect(),
            )
        })?;

        let wanted = source.unwrap_or(DEFAULT_SOURCE);
        candidates
            .iter()
            .find(|r| r.source == wanted)
            .or_else(|| candidates.first())
            .ok_or_else(|| {
                RecipeError::NotFound(
                    name.to_string(),
                    self.search_paths.iter().map(|(_, p)| p.display().to_string()).collect(),
                )
            })
    }

    pub fn find_all_sources(&self, name: &str) -> Vec<(String, PathBuf)> {
        self.recipes
            .get(name)
            .map(|rs| rs.iter().map(|r| (r.source.clone(), r.base_dir.clone())).collect())
            .unwrap_or_default()
    }

    pub fn list_all(&self, include_all_sources: bool) -> Vec<&Recipe> {
        if include_all_sources {
            self.recipes.values().flatten().collect()
        } else {
            self.recipes
                .values()
                .filter_map(|rs| rs.iter().find(|r| r.source == DEFAULT_SOURCE).or_else(|| rs.first()))
                .collect()
        }
    }

    pub fn get_by_source(&self, source: &str) -> Vec<&Recipe> {
        self.recipes
            .values()
            .flatten()
            .filter(|r| r.source == source)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn write_recipe(root: &Path, subdir: &str, name: &str, runtime: &str, ext: &str, deps: &str) {
        let dir = root.join(subdir).join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("recipe.md"),
            format!(
                "---\nname: {name}\ntype: atomic\nruntime: {runtime}\nversion: \"1.0\"\ndescription: d\nuse_cases: [a]\noutput_targets: [stdout]\n{deps}\n---\nbody\n"
            ),
        )
        .unwrap();
        std::fs::write(dir.join(format!("recipe.{ext}")), "# script").unwrap();
    }

    #[test]
    fn scan_discovers_valid_recipes_and_skips_missing_script() {
        let dir = tempdir().unwrap();
        write_recipe(dir.path(), "atomic/chrome", "click-button", "chrome-js", "js", "");
        let broken = dir.path().join("atomic/system").join("broken");
        std::fs::create_dir_all(&broken).unwrap();
        std::fs::write(
            broken.join("recipe.md"),
            "---\nname: broken\ntype: atomic\nruntime: python\nversion: \"1.0\"\ndescription: d\nuse_cases: [a]\noutput_targets: [stdout]\n---\nbody\n",
        )
        .unwrap();

        let mut registry = RecipeRegistry::new(dir.path());
        registry.scan();

        assert!(registry.find("click-button", None).is_ok());
        assert!(registry.find("broken", None).is_err());
    }

    #[test]
    fn workflow_with_missing_dependency_is_dropped() {
        let dir = tempdir().unwrap();
        write_recipe(
            dir.path(),
            "workflows",
            "full-pipeline",
            "shell",
            "sh",
            "dependencies: [nonexistent]",
        );

        let mut registry = RecipeRegistry::new(dir.path());
        registry.scan();

        assert!(registry.find("full-pipeline", None).is_err());
    }

    #[test]
    fn find_missing_recipe_lists_searched_paths() {
        let dir = tempdir().unwrap();
        let registry = RecipeRegistry::new(dir.path());
        match registry.find("ghost", None) {
            Err(RecipeError::NotFound(name, searched)) => {
                assert_eq!(name, "ghost");
                assert_eq!(searched.len(), 1);
            }
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
