use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

mod cli;

use cli::{Cli, Commands, RecipeCommands, RunCommands, SessionCommands};
use frago_cdp::{CdpConfig, CdpSession};
use frago_runs::{ContextStore, RunStatus, RunStore};

fn default_frago_home_dir() -> PathBuf {
    directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".frago"))
        .unwrap_or_else(|| PathBuf::from(".frago"))
}

fn default_projects_dir() -> PathBuf {
    default_frago_home_dir().join("projects")
}

#[tokio::main]
async fn main() -> Result<()> {
    frago_core::logging::init();

    let cli = Cli::parse();
    let projects_dir = cli.projects_dir.unwrap_or_else(default_projects_dir);

    match cli.command {
        Commands::Session { command } => run_session_command(command).await,
        Commands::Run { command } => run_run_command(command, &projects_dir).await,
        Commands::Recipe { command } => run_recipe_command(command).await,
    }
}

async fn run_session_command(command: SessionCommands) -> Result<()> {
    match command {
        SessionCommands::Connect { host, port } => {
            let session = CdpSession::connect(CdpConfig::new(host, port)).await.context("connecting to Chrome")?;
            println!("connected: {:?}", session.config());
            Ok(())
        }
        SessionCommands::Screenshot {
            run_id,
            description,
            host,
            port,
        } => {
            let projects_dir = default_projects_dir();
            let store = RunStore::new(&projects_dir);
            let run_dir = store.run_dir(&run_id);
            let session = CdpSession::connect(CdpConfig::new(host, port)).await.context("connecting to Chrome")?;
            let pipeline = frago_runs::ScreenshotPipeline::new(&run_dir);
            let record = pipeline.capture(&session, &description).await.context("capturing screenshot")?;
            println!("{}", serde_json::to_string_pretty(&serde_json::json!({
                "sequence_number": record.sequence_number,
                "file_path": record.file_path,
            }))?);
            Ok(())
        }
    }
}

async fn run_run_command(command: RunCommands, projects_dir: &std::path::Path) -> Result<()> {
    let store = RunStore::new(projects_dir);
    let context = ContextStore::new(default_frago_home_dir(), projects_dir);

    match command {
        RunCommands::Create { theme_description, run_id } => {
            let run = store.create_run(&theme_description, run_id.as_deref())?;
            println!("{}", serde_json::to_string_pretty(&run)?);
            Ok(())
        }
        RunCommands::Find { run_id } => {
            let run = store.find_run(&run_id)?;
            println!("{}", serde_json::to_string_pretty(&run)?);
            Ok(())
        }
        RunCommands::List { active_only } => {
            let status = active_only.then_some(RunStatus::Active);
            let runs = store.list_runs(status)?;
            println!("{}", serde_json::to_string_pretty(&runs)?);
            Ok(())
        }
        RunCommands::Archive { run_id } => {
            let run = store.archive_run(&run_id)?;
            println!("{}", serde_json::to_string_pretty(&run)?);
            Ok(())
        }
        RunCommands::Current => {
            let ctx = context.get_current_run()?;
            println!("{}", serde_json::to_string_pretty(&ctx)?);
            Ok(())
        }
        RunCommands::SetCurrent { run_id } => {
            let run = store.find_run(&run_id)?;
            let ctx = context.set_current_run(&run.run_id, &run.theme_description)?;
            println!("{}", serde_json::to_string_pretty(&ctx)?);
            Ok(())
        }
        RunCommands::Release => {
            context.release_context()?;
            Ok(())
        }
        RunCommands::Discover { task_description, threshold } => {
            let matches = frago_discovery::discover_similar_runs(&store, &task_description, threshold, None)?;
            println!("{}", serde_json::to_string_pretty(&matches)?);
            Ok(())
        }
    }
}

async fn run_recipe_command(command: RecipeCommands) -> Result<()> {
    let recipes_dir = directories::BaseDirs::new()
        .map(|d| d.home_dir().join(".frago").join("recipes"))
        .unwrap_or_else(|| PathBuf::from(".frago/recipes"));
    let mut registry = frago_recipes::RecipeRegistry::new(&recipes_dir);
    registry.scan();

    match command {
        RecipeCommands::List { all_sources } => {
            let names: Vec<&str> = registry.list_all(all_sources).iter().map(|r| r.metadata.name.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&names)?);
            Ok(())
        }
        RecipeCommands::Run { name, params, output, output_path } => {
            let recipe = registry.find(&name, None)?;
            let params: std::collections::BTreeMap<String, serde_json::Value> = serde_json::from_str(&params)?;
            let output_target = match output.as_str() {
                "file" => frago_recipes::OutputTarget::File,
                "clipboard" => frago_recipes::OutputTarget::Clipboard,
                _ => frago_recipes::OutputTarget::Stdout,
            };
            let output_options = frago_recipes::OutputOptions { path: output_path };

            let env_loader = frago_env::EnvLoader::new(std::env::current_dir()?);
            let runner = frago_recipes::RecipeRunner::new(&env_loader);
            let result = runner
                .run(recipe, params, output_target, &output_options, &Default::default(), None)
                .await?;

            eprintln!("executed {} ({}) in {:.3}s", result.recipe_name, result.runtime, result.execution_time_secs);
            Ok(())
        }
    }
}
