//! Screenshot Pipeline: numbers and names screenshots within a run's
//! `screenshots/` directory, delegating capture to `frago_cdp`. Grounded
//! on `original_source/src/frago/run/screenshot.py`.

use std::path::{Path, PathBuf};

use regex::Regex;
use std::sync::LazyLock;

use frago_cdp::commands::Screenshot as CdpScreenshot;
use frago_cdp::CdpSession;

use crate::error::RunError;
use crate::models::ScreenshotRecord;
use crate::utils::{ensure_directory_exists, generate_theme_slug};

static SEQ_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d{3})_").unwrap());

const MAX_DESCRIPTION_SLUG_LEN: usize = 40;

pub struct ScreenshotPipeline {
    screenshots_dir: PathBuf,
}

impl ScreenshotPipeline {
    pub fn new(run_dir: &Path) -> Self {
        Self {
            screenshots_dir: run_dir.join("screenshots"),
        }
    }

    /// Scans existing `NNN_*.png` files and returns the next sequence
    /// number (1-999), starting at 1 if none exist.
    pub fn next_sequence_number(&self) -> Result<u32, RunError> {
        if !self.screenshots_dir.is_dir() {
            return Ok(1);
        }

        let mut max_seen = 0u32;
        for entry in std::fs::read_dir(&self.screenshots_dir).map_err(|e| RunError::FileSystem {
            op: "list".into(),
            path: self.screenshots_dir.display().to_string(),
            reason: e.to_string(),
        })? {
            let entry = entry.map_err(|e| RunError::FileSystem {
                op: "list".into(),
                path: self.screenshots_dir.display().to_string(),
                reason: e.to_string(),
            })?;
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if entry.path().extension().and_then(|e| e.to_str()) != Some("png") {
                continue;
            }
            if let Some(caps) = SEQ_RE.captures(&name) {
                if let Ok(n) = caps[1].parse::<u32>() {
                    max_seen = max_seen.max(n);
                }
            }
        }

        Ok(max_seen + 1)
    }

    pub async fn capture(&self, session: &CdpSession, description: &str) -> Result<ScreenshotRecord, RunError> {
        ensure_directory_exists(&self.screenshots_dir)?;
        let seq = self.next_sequence_number()?;
        let slug = generate_theme_slug(description, MAX_DESCRIPTION_SLUG_LEN);
        let filename = format!("{seq:03}_{slug}.png");
        let path = self.screenshots_dir.join(&filename);

        CdpScreenshot(session).capture(Some(&path), false, "png", None).await?;

        Ok(ScreenshotRecord {
            sequence_number: seq,
            description: description.to_string(),
            file_path: path.display().to_string(),
            timestamp: chrono::Utc::now(),
        })
    }
}
