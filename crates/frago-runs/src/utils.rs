use std::path::Path;

use regex::Regex;
use std::sync::LazyLock;

use crate::error::RunError;

static RUN_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]{1,50}$").unwrap());

pub fn is_valid_run_id(run_id: &str) -> bool {
    RUN_ID_RE.is_match(run_id)
}

/// Slugifies `description`; falls back to `task-<epoch-seconds>` if the
/// result is empty (pure-symbol or non-ASCII input).
pub fn generate_theme_slug(description: &str, max_length: usize) -> String {
    let mut slug = slug::slugify(description);
    if slug.len() > max_length {
        slug.truncate(max_length);
        slug = slug.trim_end_matches('-').to_string();
    }
    if slug.is_empty() {
        let epoch = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs();
        slug = format!("task-{epoch}");
    }
    slug
}

pub fn ensure_directory_exists(path: &Path) -> Result<(), RunError> {
    std::fs::create_dir_all(path).map_err(|e| RunError::FileSystem {
        op: "create directory".into(),
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_idempotence() {
        let s = generate_theme_slug("Upwork Python Jobs Search", 50);
        let s2 = generate_theme_slug(&s, 50);
        assert_eq!(s, s2);
        assert!(Regex::new(r"^[a-z0-9-]+$").unwrap().is_match(&s));
        assert!(s.len() <= 50);
    }

    #[test]
    fn empty_slug_falls_back_to_timestamp() {
        let s = generate_theme_slug("!!!", 50);
        assert!(s.starts_with("task-"));
    }

    #[test]
    fn run_id_shape_validates() {
        assert!(is_valid_run_id("20260730-upwork-jobs"));
        assert!(!is_valid_run_id("Upwork_Jobs"));
        assert!(!is_valid_run_id(""));
    }
}
