//! Output sink dispatch. Grounded on
//! `original_source/src/frago/recipes/output_handler.py`'s `OutputHandler`.

use crate::error::RecipeError;
use crate::metadata::OutputTarget;

#[derive(Debug, Clone, Default)]
pub struct OutputOptions {
    pub path: Option<std::path::PathBuf>,
}

pub struct OutputHandler;

impl OutputHandler {
    pub fn dispatch(data: &serde_json::Value, target: OutputTarget, options: &OutputOptions) -> Result<(), RecipeError> {
        match target {
            OutputTarget::Stdout => Self::to_stdout(data),
            OutputTarget::File => Self::to_file(data, options),
            OutputTarget::Clipboard => Self::to_clipboard(data),
        }
    }

    fn to_stdout(data: &serde_json::Value) -> Result<(), RecipeError> {
        println!("{}", serde_json::to_string_pretty(data)?);
        Ok(())
    }

    fn to_file(data: &serde_json::Value, options: &OutputOptions) -> Result<(), RecipeError> {
        let path = options
            .path
            .as_ref()
            .ok_or_else(|| RecipeError::Output("file".into(), "options.path is required".into()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(data)?)?;
        Ok(())
    }

    fn to_clipboard(data: &serde_json::Value) -> Result<(), RecipeError> {
        let mut clipboard = arboard::Clipboard::new()
            .map_err(|e| RecipeError::Output("clipboard".into(), format!("clipboard unavailable: {e} (install a system clipboard provider)")))?;
        clipboard
            .set_text(serde_json::to_string(data)?)
            .map_err(|e| RecipeError::Output("clipboard".into(), e.to_string()))
    }
}
