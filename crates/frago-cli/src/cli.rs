use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "frago", version, about = "Browser automation and AI task orchestration toolkit")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root directory holding run directories (default: ~/.frago/projects)
    #[arg(long, global = true)]
    pub projects_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// CDP session operations
    Session {
        #[command(subcommand)]
        command: SessionCommands,
    },
    /// Run store operations
    Run {
        #[command(subcommand)]
        command: RunCommands,
    },
    /// Recipe registry and runner operations
    Recipe {
        #[command(subcommand)]
        command: RecipeCommands,
    },
}

#[derive(Subcommand)]
pub enum SessionCommands {
    /// Connect to a running Chrome instance and print target info
    Connect {
        #[arg(long, default_value = "localhost")]
        host: String,
        #[arg(long, default_value_t = 9222)]
        port: u16,
    },
    /// Capture a screenshot into a run's screenshots directory
    Screenshot {
        run_id: String,
        description: String,
        #[arg(long, default_value = "localhost")]
        host: String,
        #[arg(long, default_value_t = 9222)]
        port: u16,
    },
}

#[derive(Subcommand)]
pub enum RunCommands {
    /// Create a new run
    Create {
        theme_description: String,
        #[arg(long)]
        run_id: Option<String>,
    },
    /// Find an existing run by id
    Find { run_id: String },
    /// List runs, optionally filtered by status
    List {
        #[arg(long)]
        active_only: bool,
    },
    /// Archive a run
    Archive { run_id: String },
    /// Print the current-run context
    Current,
    /// Set the current-run context
    SetCurrent { run_id: String },
    /// Release the current-run context
    Release,
    /// Find runs whose theme is similar to a task description
    Discover {
        task_description: String,
        #[arg(long)]
        threshold: Option<f64>,
    },
}

#[derive(Subcommand)]
pub enum RecipeCommands {
    /// List all registered recipes
    List {
        #[arg(long)]
        all_sources: bool,
    },
    /// Run a recipe by name
    Run {
        name: String,
        /// JSON object of parameters, e.g. '{"query": "rust jobs"}'
        #[arg(long, default_value = "{}")]
        params: String,
        #[arg(long, default_value = "stdout")]
        output: String,
        #[arg(long)]
        output_path: Option<PathBuf>,
    },
}
