use std::path::Path;

use base64::Engine;
use serde_json::{json, Value};

use crate::error::CdpError;
use crate::session::CdpSession;

pub struct Screenshot<'a>(pub &'a CdpSession);

impl<'a> Screenshot<'a> {
    /// Decodes base64 from `Page.captureScreenshot`; writes atomically to
    /// `file` when provided (creating parent directories).
    pub async fn capture(
        &self,
        file: Option<&Path>,
        full_page: bool,
        format: &str,
        quality: Option<u8>,
    ) -> Result<Vec<u8>, CdpError> {
        let mut params = json!({ "format": format, "captureBeyondViewport": full_page });
        if let Some(q) = quality {
            params["quality"] = json!(q);
        }

        let resp = self.0.send_command("Page.captureScreenshot", params).await?;
        let data_b64 = resp
            .get("result")
            .and_then(|r| r.get("data"))
            .and_then(Value::as_str)
            .ok_or_else(|| CdpError::Protocol {
                code: 0,
                message: "Page.captureScreenshot returned no data".into(),
            })?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(data_b64)
            .map_err(|e| CdpError::Protocol {
                code: 0,
                message: format!("invalid base64 screenshot data: {e}"),
            })?;

        if let Some(path) = file {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let tmp_name = format!(".tmp_{}", path.file_name().and_then(|n| n.to_str()).unwrap_or("screenshot.png"));
            let tmp = path.with_file_name(tmp_name);
            std::fs::write(&tmp, &bytes)?;
            if let Err(e) = std::fs::rename(&tmp, path) {
                let _ = std::fs::remove_file(&tmp);
                return Err(CdpError::FileSystem {
                    op: "rename".into(),
                    path: path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        }

        Ok(bytes)
    }
}
