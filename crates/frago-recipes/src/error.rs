#[derive(thiserror::Error, Debug)]
pub enum RecipeError {
    #[error("recipe '{0}' not found (searched: {1:?})")]
    NotFound(String, Vec<String>),

    #[error("failed to parse metadata at {path}: {reason}")]
    MetadataParse { path: String, reason: String },

    #[error("recipe '{recipe_name}' failed validation: {errors:?}")]
    Validation {
        recipe_name: String,
        errors: Vec<String>,
    },

    #[error("recipe '{recipe_name}' ({runtime}) exited {exit_code}: {}", stderr_excerpt(stderr))]
    Execution {
        recipe_name: String,
        runtime: String,
        exit_code: i32,
        stdout: String,
        stderr: String,
    },

    #[error("output target '{0}' failed: {1}")]
    Output(String, String),

    #[error(transparent)]
    Env(#[from] frago_env::EnvError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Error messages truncate stderr to 200 chars; the full text still lives
/// on the `stderr` field for callers that want it.
fn stderr_excerpt(stderr: &str) -> String {
    stderr.chars().take(200).collect()
}

impl RecipeError {
    pub fn execution(recipe_name: &str, runtime: &str, exit_code: i32, stdout: &str, stderr: &str) -> Self {
        Self::Execution {
            recipe_name: recipe_name.to_string(),
            runtime: runtime.to_string(),
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }
}
