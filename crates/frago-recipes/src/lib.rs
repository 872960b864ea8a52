//! Recipe Registry, Recipe Runner, and Output Handler (C9, C10, C11).

pub mod error;
pub mod metadata;
pub mod output;
pub mod registry;
pub mod runner;

pub use error::RecipeError;
pub use metadata::{parse_metadata_file, validate_metadata, validate_params, OutputTarget, RecipeMetadata, RecipeType, Runtime};
pub use output::{OutputHandler, OutputOptions};
pub use registry::{Recipe, RecipeRegistry};
pub use runner::{RecipeRunner, RunResult};
