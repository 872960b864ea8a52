//! Per-runtime recipe execution. Grounded on
//! `crates/csa-executor/src/executor.rs`'s tagged-enum dispatch shape
//! (one method per variant) and
//! `original_source/src/frago/recipes/runner.py` (`_run_chrome_js`,
//! `_run_python`, `_run_shell`) for the exact command arrays, the 10MB
//! stdout cap, and the chrome-js JSON-decode-failure fallback to
//! `{"result": stdout.strip()}`.

use std::collections::BTreeMap;
use std::os::unix::fs::PermissionsExt;
use std::process::Stdio;
use std::time::Instant;

use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::process::Command;

use frago_env::{EnvLoader, EnvVarRequirement, WorkflowContext};

use crate::error::RecipeError;
use crate::metadata::Runtime as RecipeRuntime;
use crate::output::{OutputHandler, OutputOptions};
use crate::registry::Recipe;
use crate::metadata::{validate_params, OutputTarget};

const STDOUT_CAP_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, serde::Serialize)]
pub struct RunResult {
    pub success: bool,
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub execution_time_secs: f64,
    pub recipe_name: String,
    pub runtime: String,
}

pub struct RecipeRunner<'a> {
    env_loader: &'a EnvLoader,
}

impl<'a> RecipeRunner<'a> {
    pub fn new(env_loader: &'a EnvLoader) -> Self {
        Self { env_loader }
    }

    pub async fn run(
        &self,
        recipe: &Recipe,
        params: BTreeMap<String, Value>,
        output_target: OutputTarget,
        output_options: &OutputOptions,
        env_overrides: &BTreeMap<String, String>,
        workflow_context: Option<&WorkflowContext>,
    ) -> Result<RunResult, RecipeError> {
        let started = Instant::now();
        let metadata = &recipe.metadata;

        let param_errors = validate_params(metadata, &params);
        if !param_errors.is_empty() {
            return Err(RecipeError::Validation {
                recipe_name: metadata.name.clone(),
                errors: param_errors,
            });
        }

        let declarations: BTreeMap<String, EnvVarRequirement> = metadata
            .env
            .iter()
            .map(|(k, v)| {
                (
                    k.clone(),
                    EnvVarRequirement {
                        required: v.required,
                        default: v.default.clone(),
                    },
                )
            })
            .collect();
        let resolved_env = self
            .env_loader
            .resolve_for_recipe(&declarations, workflow_context, env_overrides)?;
        let recipe_env = EnvLoader::recipe_env_subset(&resolved_env, &declarations);

        let params_json = serde_json::to_string(&params)?;

        let data = match metadata.runtime {
            RecipeRuntime::ChromeJs => {
                self.run_chrome_js(recipe, &params_json, params.is_empty(), &recipe_env).await?
            }
            RecipeRuntime::Python => {
                self.run_subprocess_python(recipe, &params_json, &recipe_env).await?
            }
            RecipeRuntime::Shell => self.run_subprocess_shell(recipe, &params_json, &recipe_env).await?,
        };

        OutputHandler::dispatch(&data, output_target, output_options)?;

        Ok(RunResult {
            success: true,
            data,
            error: None,
            execution_time_secs: started.elapsed().as_secs_f64(),
            recipe_name: metadata.name.clone(),
            runtime: runtime_label(metadata.runtime).to_string(),
        })
    }

    /// Shells out to the CLI's own `chrome exec-js` subcommand, once to
    /// inject params (if any) and once to evaluate the script, each as its
    /// own subprocess — this runner never talks CDP in-process.
    async fn run_chrome_js(
        &self,
        recipe: &Recipe,
        params_json: &str,
        params_empty: bool,
        recipe_env: &BTreeMap<String, String>,
    ) -> Result<Value, RecipeError> {
        if !params_empty {
            let expr = format!("window.__FRAGO_PARAMS__ = {params_json}");
            let mut inject_cmd = Command::new("uv");
            inject_cmd.args(["run", "frago", "chrome", "exec-js", &expr]);
            apply_env(&mut inject_cmd, recipe_env);
            self.spawn_and_capture(recipe, "chrome-js", inject_cmd).await?;
        }

        let mut cmd = Command::new("uv");
        cmd.args(["run", "frago", "chrome", "exec-js"])
            .arg(&recipe.script_path)
            .arg("--return-value");
        apply_env(&mut cmd, recipe_env);

        let stdout = self.spawn_and_capture(recipe, "chrome-js", cmd).await?;
        Ok(serde_json::from_str(stdout.trim()).unwrap_or_else(|_| serde_json::json!({ "result": stdout.trim() })))
    }

    async fn run_subprocess_python(
        &self,
        recipe: &Recipe,
        params_json: &str,
        recipe_env: &BTreeMap<String, String>,
    ) -> Result<Value, RecipeError> {
        let mut cmd = if recipe.metadata.system_packages {
            let mut cmd = Command::new("/usr/bin/python3");
            cmd.arg(&recipe.script_path);
            cmd
        } else {
            let mut cmd = Command::new("uv");
            cmd.arg("run").arg(&recipe.script_path);
            cmd
        };
        cmd.arg(params_json);

        let mut env = std::env::vars().collect::<BTreeMap<_, _>>();
        if recipe.metadata.system_packages {
            env.remove("VIRTUAL_ENV");
            env.remove("PYTHONHOME");
        }
        env.extend(recipe_env.clone());
        cmd.env_clear().envs(env);

        self.spawn_and_parse(recipe, "python", cmd).await
    }

    async fn run_subprocess_shell(
        &self,
        recipe: &Recipe,
        params_json: &str,
        recipe_env: &BTreeMap<String, String>,
    ) -> Result<Value, RecipeError> {
        let perms = std::fs::metadata(&recipe.script_path)?.permissions();
        if perms.mode() & 0o100 == 0 {
            return Err(RecipeError::execution(
                &recipe.metadata.name,
                "shell",
                -1,
                "",
                "script is not executable (owner +x bit required)",
            ));
        }

        let mut cmd = Command::new(&recipe.script_path);
        cmd.arg(params_json);
        apply_env(&mut cmd, recipe_env);

        self.spawn_and_parse(recipe, "shell", cmd).await
    }

    /// Spawns `cmd`, enforces the stdout cap and exit code, and parses the
    /// captured stdout as JSON, raising `Execution` on decode failure.
    async fn spawn_and_parse(&self, recipe: &Recipe, runtime: &str, cmd: Command) -> Result<Value, RecipeError> {
        let stdout = self.spawn_and_capture(recipe, runtime, cmd).await?;
        serde_json::from_str(stdout.trim()).map_err(|e| {
            RecipeError::execution(&recipe.metadata.name, runtime, 0, &stdout, &format!("JSON decode failed: {e}"))
        })
    }

    /// Spawns `cmd`, enforces the stdout cap and exit code, and returns the
    /// captured stdout as a lossily-decoded string. Callers parse it.
    async fn spawn_and_capture(&self, recipe: &Recipe, runtime: &str, mut cmd: Command) -> Result<String, RecipeError> {
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        let mut child = cmd.spawn()?;

        let mut stdout_pipe = child.stdout.take().expect("piped stdout");
        let mut stderr_pipe = child.stderr.take().expect("piped stderr");

        let mut stdout_buf = Vec::new();
        let mut capped_reader = (&mut stdout_pipe).take(STDOUT_CAP_BYTES as u64 + 1);
        capped_reader.read_to_end(&mut stdout_buf).await?;

        let mut stderr_buf = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut stderr_pipe, &mut stderr_buf).await.ok();

        let status = child.wait().await?;

        if stdout_buf.len() > STDOUT_CAP_BYTES {
            return Err(RecipeError::execution(
                &recipe.metadata.name,
                runtime,
                -1,
                &String::from_utf8_lossy(&stdout_buf),
                &format!("stdout exceeded {STDOUT_CAP_BYTES} byte cap"),
            ));
        }

        let stdout_str = String::from_utf8_lossy(&stdout_buf).into_owned();

        if !status.success() {
            return Err(RecipeError::execution(
                &recipe.metadata.name,
                runtime,
                status.code().unwrap_or(-1),
                &stdout_str,
                &stderr_buf,
            ));
        }

        Ok(stdout_str)
    }
}

fn apply_env(cmd: &mut Command, recipe_env: &BTreeMap<String, String>) {
    let mut env = std::env::vars().collect::<BTreeMap<_, _>>();
    env.extend(recipe_env.clone());
    cmd.env_clear().envs(env);
}

fn runtime_label(runtime: RecipeRuntime) -> &'static str {
    match runtime {
        RecipeRuntime::ChromeJs => "chrome-js",
        RecipeRuntime::Python => "python",
        RecipeRuntime::Shell => "shell",
    }
}
