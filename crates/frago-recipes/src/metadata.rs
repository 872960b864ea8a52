//! Recipe metadata: YAML frontmatter parsing and validation. Grounded on
//! `original_source/src/frago/recipes/metadata.py` for the exact
//! validation rules, and `crates/weave/src/parser.rs`'s
//! `parse_frontmatter` for the `---`-delimited splitting algorithm
//! (adapted here from TOML to YAML via `serde_yaml`).

use std::collections::BTreeMap;
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::error::RecipeError;

static NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap());
static VERSION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+\.\d+(\.\d+)?$").unwrap());
static ENV_NAME_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipeType {
    Atomic,
    Workflow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Runtime {
    ChromeJs,
    Python,
    Shell,
}

impl Runtime {
    pub fn script_extension(self) -> &'static str {
        match self {
            Runtime::ChromeJs => "js",
            Runtime::Python => "py",
            Runtime::Shell => "sh",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputTarget {
    Stdout,
    File,
    Clipboard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputSpec {
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvSpec {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeMetadata {
    pub name: String,
    #[serde(rename = "type")]
    pub recipe_type: RecipeType,
    pub runtime: Runtime,
    pub version: String,
    pub description: String,
    pub use_cases: Vec<String>,
    pub output_targets: Vec<OutputTarget>,
    #[serde(default)]
    pub inputs: BTreeMap<String, InputSpec>,
    #[serde(default)]
    pub outputs: BTreeMap<String, String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub env: BTreeMap<String, EnvSpec>,
    #[serde(default)]
    pub system_packages: bool,
}

/// Splits `content` on the frontmatter delimiter the way a `recipe.md`
/// is structured: `--- \n <yaml> \n --- \n <markdown body>`.
pub fn parse_metadata_file(path: &Path) -> Result<RecipeMetadata, RecipeError> {
    let content = std::fs::read_to_string(path)?;
    let parts: Vec<&str> = content.splitn(3, "---").collect();
    if parts.len() < 3 {
        return Err(RecipeError::MetadataParse {
            path: path.display().to_string(),
            reason: "expected YAML frontmatter delimited by `---` lines".into(),
        });
    }

    serde_yaml::from_str(parts[1]).map_err(|e| RecipeError::MetadataParse {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Field-level validation beyond what serde's required/optional
/// distinction already enforces. Returns all problems found, not just
/// the first.
pub fn validate_metadata(metadata: &RecipeMetadata) -> Vec<String> {
    let mut errors = Vec::new();

    if !NAME_RE.is_match(&metadata.name) {
        errors.push(format!("name '{}' must match ^[a-zA-Z0-9_-]+$", metadata.name));
    }
    if !VERSION_RE.is_match(&metadata.version) {
        errors.push(format!("version '{}' must match ^\\d+\\.\\d+(\\.\\d+)?$", metadata.version));
    }
    if metadata.description.chars().count() > 200 {
        errors.push("description must be at most 200 characters".into());
    }
    if metadata.use_cases.is_empty() {
        errors.push("use_cases must not be empty".into());
    }
    if metadata.output_targets.is_empty() {
        errors.push("output_targets must not be empty".into());
    }
    for (name, _) in &metadata.inputs {
        if name.is_empty() {
            errors.push("input parameter name must not be empty".into());
        }
    }
    for name in metadata.env.keys() {
        if !ENV_NAME_RE.is_match(name) {
            errors.push(format!("env var name '{name}' must match ^[A-Za-z_][A-Za-z0-9_]*$"));
        }
    }

    errors
}

fn check_param_type(value: &serde_json::Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}

/// Checks `params` against `metadata.inputs`: required params must be
/// present; any provided param must match its declared type.
pub fn validate_params(
    metadata: &RecipeMetadata,
    params: &BTreeMap<String, serde_json::Value>,
) -> Vec<String> {
    let mut errors = Vec::new();

    for (name, spec) in &metadata.inputs {
        match params.get(name) {
            Some(value) => {
                if !check_param_type(value, &spec.param_type) {
                    errors.push(format!("param '{name}' must be of type {}", spec.param_type));
                }
            }
            None if spec.required => errors.push(format!("missing required param '{name}'")),
            None => {}
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_doc() -> String {
        r#"---
name: extract-jobs
type: atomic
runtime: python
version: "1.0.0"
description: Extracts job listings
use_cases:
  - scrape job board
output_targets:
  - stdout
env:
  TOKEN:
    required: true
---
body text
"#
        .to_string()
    }

    #[test]
    fn parses_frontmatter_and_body() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.md");
        std::fs::write(&path, sample_doc()).unwrap();

        let meta = parse_metadata_file(&path).unwrap();
        assert_eq!(meta.name, "extract-jobs");
        assert_eq!(meta.runtime, Runtime::Python);
        assert!(meta.env.contains_key("TOKEN"));
    }

    #[test]
    fn rejects_file_without_closing_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipe.md");
        std::fs::write(&path, "---\nname: x\n").unwrap();
        assert!(parse_metadata_file(&path).is_err());
    }

    #[test]
    fn validate_metadata_flags_bad_name_and_version() {
        let mut meta: RecipeMetadata = serde_yaml::from_str(
            r#"
name: "bad name!"
type: atomic
runtime: shell
version: "v1"
description: d
use_cases: [a]
output_targets: [stdout]
"#,
        )
        .unwrap();
        let errors = validate_metadata(&meta);
        assert!(errors.iter().any(|e| e.contains("name")));
        assert!(errors.iter().any(|e| e.contains("version")));

        meta.name = "ok-name".into();
        meta.version = "1.0".into();
        assert!(validate_metadata(&meta).is_empty());
    }

    #[test]
    fn validate_params_reports_missing_required_and_type_mismatch() {
        let mut inputs = BTreeMap::new();
        inputs.insert(
            "query".to_string(),
            InputSpec {
                param_type: "string".into(),
                required: true,
                description: None,
            },
        );
        inputs.insert(
            "limit".to_string(),
            InputSpec {
                param_type: "number".into(),
                required: false,
                description: None,
            },
        );
        let metadata = RecipeMetadata {
            name: "x".into(),
            recipe_type: RecipeType::Atomic,
            runtime: Runtime::Python,
            version: "1.0".into(),
            description: "d".into(),
            use_cases: vec!["a".into()],
            output_targets: vec![OutputTarget::Stdout],
            inputs,
            outputs: BTreeMap::new(),
            dependencies: vec![],
            tags: vec![],
            env: BTreeMap::new(),
            system_packages: false,
        };

        let mut params = BTreeMap::new();
        params.insert("limit".to_string(), serde_json::json!("not-a-number"));
        let errors = validate_params(&metadata, &params);
        assert!(errors.iter().any(|e| e.contains("missing required param 'query'")));
        assert!(errors.iter().any(|e| e.contains("limit")));
    }
}
